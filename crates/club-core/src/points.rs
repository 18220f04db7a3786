//! # Points Module
//!
//! Provides the `Points` type for reward and tier point amounts.
//!
//! ## Two Balances, One Type
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reward points  ── pay for voucher redemptions (requestPoints)          │
//! │  Tier points    ── decide which membership tier a member holds          │
//! │                                                                         │
//! │  Both are whole numbers. The backend owns the balances; the client     │
//! │  only compares them (can this member afford that voucher? which tier   │
//! │  range contains this balance?).                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use club_core::points::Points;
//!
//! let balance = Points::from_value(30);
//! let cost = Points::from_value(50);
//!
//! assert!(!balance.covers(cost));
//! assert!(balance.covers(Points::zero()));
//! assert_eq!(balance.to_string(), "30 pts");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

/// A whole number of points.
///
/// Serialized as a bare integer, so `{"requestPoints": 50}` decodes directly.
/// Signed so that malformed form input (`-5`) can be represented and rejected
/// by validation instead of failing to parse.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Points(i64);

impl Points {
    /// Creates a point amount.
    #[inline]
    pub const fn from_value(value: i64) -> Self {
        Points(value)
    }

    /// Returns the raw number of points.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Zero points.
    #[inline]
    pub const fn zero() -> Self {
        Points(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checks whether this balance is enough to pay `cost`.
    ///
    /// ## Example
    /// ```rust
    /// use club_core::points::Points;
    ///
    /// assert!(Points::from_value(50).covers(Points::from_value(50)));
    /// assert!(!Points::from_value(49).covers(Points::from_value(50)));
    /// ```
    #[inline]
    pub const fn covers(&self, cost: Points) -> bool {
        self.0 >= cost.0
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pts", self.0)
    }
}

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Points(value)
    }
}

impl Add for Points {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Points(self.0 + other.0)
    }
}

impl AddAssign for Points {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Points {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Points(self.0 - other.0)
    }
}

impl SubAssign for Points {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}
