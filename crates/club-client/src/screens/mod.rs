//! # Screen Controllers
//!
//! Headless controllers behind the three club screens. Each one owns its
//! in-memory copy of the backend data and a banner, and talks to the backend
//! only through [`ClubApi`](crate::api::ClubApi).
//!
//! ## Data Flow
//! ```text
//! ┌──────────┐  form   ┌──────────────┐ valid? ┌──────────┐  ok   ┌──────────┐
//! │   User   │────────►│  club-core   │───────►│ ClubApi  │──────►│  load()  │
//! └──────────┘         │  validation  │        └────┬─────┘       │ (refetch)│
//!      ▲               └──────┬───────┘             │ err         └────┬─────┘
//!      │  inline errors       │                     ▼                  │
//!      └──────────────────────┘              ┌──────────────┐          │
//!      ▲                                     │    Banner    │◄─────────┘
//!      └─────────────────────────────────────│ (error/info) │ data issues
//!                                            └──────────────┘
//! ```
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`, so controllers can be shared as `Arc<Screen>` between tasks.

pub mod redeem;
pub mod tiers;
pub mod vouchers;

pub use redeem::RedeemScreen;
pub use tiers::TierScreen;
pub use vouchers::VoucherAdminScreen;

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ClientError;

// =============================================================================
// Banner
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

/// The message strip at the top of a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Banner {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Banner {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    pub fn from_error(err: &ClientError) -> Self {
        Banner::error(err.user_message())
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }

    /// Shows a success message unless an error is already on display.
    pub(crate) fn offer_success(slot: &mut Option<Banner>, message: impl Into<String>) {
        if !slot.as_ref().is_some_and(Banner::is_error) {
            *slot = Some(Banner::success(message));
        }
    }
}

/// Outcome of a form submission that passed the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<V> {
    /// Client-side validation failed; nothing was sent.
    Rejected(V),
    /// The backend accepted the change and the list was refetched.
    Saved,
}

impl<V> FormOutcome<V> {
    pub fn is_saved(&self) -> bool {
        matches!(self, FormOutcome::Saved)
    }
}

/// Locks screen state, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
