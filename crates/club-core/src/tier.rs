//! # Tier Range Validator
//!
//! Decides whether a tier entered or edited by an administrator may be sent
//! to the backend.
//!
//! ## Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ranges are CLOSED intervals. Two ranges overlap iff                    │
//! │                                                                         │
//! │        minA <= maxB  &&  maxA >= minB                                   │
//! │                                                                         │
//! │  existing  [100 ─────────── 200]                                        │
//! │  [50 ──────────── 150]               overlap (100-150)      ✗           │
//! │                      [200 ──── 300]  overlap (touches 200)  ✗           │
//! │                       [201 ─── 300]  disjoint               ✓           │
//! │                                                                         │
//! │  Adjacent tiers therefore need at least a 1-point gap.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every tier in the list is scanned, active or not, except the one being
//! edited. The first overlapping tier in list order is reported.
//!
//! ## Validation Order
//! ```text
//! candidate ──► field checks ──┬── any failed ──► result (no overlap scan)
//!                              │
//!                              └── all passed ──► overlap scan ──► result
//! ```

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::points::Points;
use crate::types::{Tier, TierInput};
use crate::validation::{
    validate_benefits, validate_max_points, validate_min_points, validate_tier_name, FieldErrors,
    FormField,
};

// =============================================================================
// Result Types
// =============================================================================

/// Fields of the tier form. `Range` carries the overlap conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierField {
    TierName,
    Benefits,
    MinPoints,
    MaxPoints,
    Range,
}

impl FormField for TierField {
    fn wire_name(&self) -> &'static str {
        match self {
            TierField::TierName => "tierName",
            TierField::Benefits => "benefits",
            TierField::MinPoints => "minPoints",
            TierField::MaxPoints => "maxPoints",
            TierField::Range => "range",
        }
    }
}

/// The existing tier a candidate collides with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierConflict {
    pub id: String,
    pub tier_name: String,
    pub min_points: Points,
    pub max_points: Points,
}

impl From<&Tier> for TierConflict {
    fn from(tier: &Tier) -> Self {
        TierConflict {
            id: tier.id.clone(),
            tier_name: tier.tier_name.clone(),
            min_points: tier.min_points,
            max_points: tier.max_points,
        }
    }
}

impl TierConflict {
    fn to_error(&self) -> ValidationError {
        ValidationError::RangeOverlap {
            tier_name: self.tier_name.clone(),
            min_points: self.min_points.value(),
            max_points: self.max_points.value(),
        }
    }
}

/// Outcome of [`validate_tier`]. Never an `Err`: every failure is a field entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierValidation {
    fields: FieldErrors<TierField>,
    conflict: Option<TierConflict>,
}

impl TierValidation {
    /// True when the candidate may be submitted.
    pub fn is_valid(&self) -> bool {
        self.fields.is_valid()
    }

    /// The overlapping tier, when the range check failed.
    pub fn conflict(&self) -> Option<&TierConflict> {
        self.conflict.as_ref()
    }

    pub fn error(&self, field: TierField) -> Option<&ValidationError> {
        self.fields.error(field)
    }

    /// Inline message for one field; empty when the field is fine.
    pub fn message(&self, field: TierField) -> String {
        self.fields.message(field)
    }

    /// `tierName` / `benefits` / `minPoints` / `maxPoints` / `range` to message.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.fields.messages()
    }

    pub fn fields(&self) -> &FieldErrors<TierField> {
        &self.fields
    }
}

// =============================================================================
// Overlap Detection
// =============================================================================

/// Boundary-inclusive overlap test for two closed point ranges.
///
/// ## Example
/// ```rust
/// use club_core::points::Points;
/// use club_core::tier::ranges_overlap;
///
/// let p = Points::from_value;
/// assert!(ranges_overlap(p(0), p(100), p(100), p(200)));
/// assert!(!ranges_overlap(p(0), p(99), p(100), p(200)));
/// ```
#[inline]
pub fn ranges_overlap(a_min: Points, a_max: Points, b_min: Points, b_max: Points) -> bool {
    a_min <= b_max && a_max >= b_min
}

/// First tier in list order whose range overlaps `[min, max]`.
///
/// Active and inactive tiers are both considered; `exclude_id` is skipped.
pub fn find_overlap<'a>(
    min: Points,
    max: Points,
    exclude_id: Option<&str>,
    tiers: &'a [Tier],
) -> Option<&'a Tier> {
    tiers
        .iter()
        .filter(|t| Some(t.id.as_str()) != exclude_id)
        .find(|t| ranges_overlap(min, max, t.min_points, t.max_points))
}

// =============================================================================
// Validator
// =============================================================================

/// Validates a candidate tier against the field rules and the current list.
///
/// ## Arguments
/// * `candidate` - Form values (new tier, or edited values of an existing one)
/// * `exclude_id` - Id of the tier being edited, so it is not compared with itself
/// * `tiers` - The full current tier list
///
/// ## Example
/// ```rust
/// use club_core::tier::{validate_tier, TierField};
/// use club_core::types::{Tier, TierInput};
///
/// let tiers = vec![
///     Tier::new("bronze", "Bronze", 0, 999),
///     Tier::new("silver", "Silver", 1000, 4999),
/// ];
///
/// let result = validate_tier(&TierInput::new("Mixed", "-", 500, 1500), None, &tiers);
/// assert_eq!(result.conflict().unwrap().tier_name, "Bronze");
/// assert!(!result.message(TierField::Range).is_empty());
///
/// // Editing Bronze itself does not conflict with Bronze
/// let edit = TierInput::new("Bronze", "Welcome gift", 0, 900);
/// assert!(validate_tier(&edit, Some("bronze"), &tiers).is_valid());
/// ```
pub fn validate_tier(
    candidate: &TierInput,
    exclude_id: Option<&str>,
    tiers: &[Tier],
) -> TierValidation {
    let mut fields = FieldErrors::default();

    fields.check(TierField::TierName, validate_tier_name(&candidate.tier_name));
    fields.check(TierField::Benefits, validate_benefits(&candidate.benefits));
    fields.check(
        TierField::MinPoints,
        validate_min_points(candidate.min_points),
    );
    fields.check(
        TierField::MaxPoints,
        validate_max_points(candidate.min_points, candidate.max_points),
    );

    if !fields.is_valid() {
        return TierValidation {
            fields,
            conflict: None,
        };
    }

    let conflict = find_overlap(
        candidate.min_points,
        candidate.max_points,
        exclude_id,
        tiers,
    )
    .map(TierConflict::from);

    if let Some(conflict) = &conflict {
        fields.insert(TierField::Range, conflict.to_error());
    }

    TierValidation { fields, conflict }
}

/// The active tier whose range contains `points`, in list order.
pub fn tier_for_points(points: Points, tiers: &[Tier]) -> Option<&Tier> {
    tiers.iter().filter(|t| t.active).find(|t| t.contains(points))
}
