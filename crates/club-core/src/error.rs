//! # Error Types
//!
//! Domain-specific error types for club-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  club-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Field errors and range conflicts               │
//! │  └── DataShapeError   - List responses that are not lists              │
//! │                                                                         │
//! │  club-client errors (separate crate)                                   │
//! │  └── ClientError      - Config, credentials, transport, server         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → Banner              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field errors are never sent to the backend. They are collected into a
//! [`TierValidation`](crate::tier::TierValidation) or
//! [`VoucherValidation`](crate::validation::VoucherValidation) and shown inline.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A redemption request for this voucher is already outstanding.
    ///
    /// ## When This Occurs
    /// ```text
    /// Click "Redeem" ──► request sent (PENDING)
    ///      │
    ///      ▼
    /// Click "Redeem" again before the response
    ///      │
    ///      ▼
    /// RedemptionInFlight { voucher_id } ── no second request is sent
    /// ```
    #[error("A redemption for voucher {voucher_id} is already in progress")]
    RedemptionInFlight { voucher_id: String },

    /// Voucher is not in the current catalog.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    /// Tier is not in the current tier list.
    #[error("Tier not found: {0}")]
    TierNotFound(String),

    /// The voucher exists but cannot be redeemed right now.
    #[error("Voucher {code} cannot be redeemed: {reason}")]
    NotRedeemable { code: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed list data (wraps DataShapeError).
    #[error("Data format error: {0}")]
    DataShape(#[from] DataShapeError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The `Display` text of each variant is the inline message shown next to the
/// offending form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be greater than zero.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly greater than another field.
    #[error("{field} must be greater than {other}")]
    MustExceed { field: String, other: String },

    /// Invalid format (e.g., whitespace in a code, date in the past).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., voucher code already in the catalog).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Value refers to something that does not exist (e.g., unknown tier).
    #[error("{field} '{value}' does not exist")]
    UnknownReference { field: String, value: String },

    /// Point range intersects an existing tier.
    ///
    /// Ranges are closed intervals, so `[0, 100]` and `[100, 200]` conflict.
    #[error("Point range overlaps with tier \"{tier_name}\" ({min_points}-{max_points})")]
    RangeOverlap {
        tier_name: String,
        min_points: i64,
        max_points: i64,
    },
}

// =============================================================================
// Data Shape Error
// =============================================================================

/// A list response from the backend did not have the expected shape.
///
/// These never abort a screen: the list is rendered empty (or with the
/// entries that did decode) and the error is shown as a banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataShapeError {
    /// Expected a JSON array, got something else.
    #[error("expected a list but received {found}")]
    NotAList { found: &'static str },

    /// Some array entries could not be decoded and were skipped.
    #[error("{skipped} of {total} entries could not be read")]
    MalformedEntries { skipped: usize, total: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "Tier name".to_string(),
        };
        assert_eq!(err.to_string(), "Tier name is required");

        let err = ValidationError::TooLong {
            field: "Tier name".to_string(),
            max: 30,
        };
        assert_eq!(err.to_string(), "Tier name must be at most 30 characters");

        let err = ValidationError::MustExceed {
            field: "Max points".to_string(),
            other: "min points".to_string(),
        };
        assert_eq!(err.to_string(), "Max points must be greater than min points");
    }

    #[test]
    fn test_overlap_message_names_conflicting_tier() {
        let err = ValidationError::RangeOverlap {
            tier_name: "Bronze".to_string(),
            min_points: 0,
            max_points: 999,
        };
        assert_eq!(
            err.to_string(),
            "Point range overlaps with tier \"Bronze\" (0-999)"
        );
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core: CoreError = ValidationError::Required {
            field: "Code".to_string(),
        }
        .into();
        assert!(matches!(core, CoreError::Validation(_)));

        let core: CoreError = DataShapeError::NotAList { found: "object" }.into();
        assert_eq!(
            core.to_string(),
            "Data format error: expected a list but received object"
        );
    }
}
