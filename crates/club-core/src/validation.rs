//! # Validation Module
//!
//! Field rules for the tier and voucher admin forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (this crate)                                            │
//! │  ├── Required fields, lengths, numeric bounds                          │
//! │  ├── Cross-record rules (tier overlap, duplicate voucher code)         │
//! │  └── Inline messages; nothing is sent while any field fails            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend                                                      │
//! │  └── Authoritative checks, reported back as server errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-field validators return `Result<(), ValidationError>`. Whole-form
//! checks ([`validate_voucher`], [`crate::tier::validate_tier`]) collect
//! every failure into a [`FieldErrors`] map instead of stopping at the first.
//!
//! ## Usage
//! ```rust
//! use club_core::validation::{validate_tier_name, validate_voucher_code};
//!
//! assert!(validate_tier_name("Gold").is_ok());
//! assert!(validate_tier_name("   ").is_err());
//! assert!(validate_voucher_code("HAS SPACE").is_err());
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::points::Points;
use crate::types::{DiscountType, Tier, Voucher, VoucherInput};
use crate::{MAX_TIER_NAME_LEN, MAX_VOUCHER_CODE_LEN, VOUCHER_CODE_SEPARATOR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Error Collection
// =============================================================================

/// A form field that can carry an inline error.
pub trait FormField: Copy + Ord {
    /// The camelCase name used by the front end to place the message.
    fn wire_name(&self) -> &'static str;
}

/// Per-field validation outcome of a whole form.
///
/// An absent entry means the field is fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: FormField> {
    errors: BTreeMap<F, ValidationError>,
}

impl<F: FormField> Default for FieldErrors<F> {
    fn default() -> Self {
        FieldErrors {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: FormField> FieldErrors<F> {
    /// Records the error of `check` under `field`, if any.
    pub fn check(&mut self, field: F, check: ValidationResult<()>) {
        if let Err(err) = check {
            self.errors.insert(field, err);
        }
    }

    pub fn insert(&mut self, field: F, err: ValidationError) {
        self.errors.insert(field, err);
    }

    /// True when no field has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: F) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    /// Inline message for one field; empty string when the field is fine.
    pub fn message(&self, field: F) -> String {
        self.errors
            .get(&field)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Wire field name to message, for every failing field.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.errors
            .iter()
            .map(|(field, err)| (field.wire_name(), err.to_string()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&F, &ValidationError)> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Tier Field Validators
// =============================================================================

/// Validates a tier name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 30 characters
pub fn validate_tier_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "Tier name".to_string(),
        });
    }

    if name.chars().count() > MAX_TIER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "Tier name".to_string(),
            max: MAX_TIER_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the benefits description (must not be blank).
pub fn validate_benefits(benefits: &str) -> ValidationResult<()> {
    if benefits.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Benefits".to_string(),
        });
    }

    Ok(())
}

/// Validates the lower bound of a tier range (`>= 0`).
pub fn validate_min_points(min: Points) -> ValidationResult<()> {
    if min.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "Min points".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the upper bound of a tier range.
///
/// ## Rules
/// - Must be positive (`> 0`)
/// - Must be strictly greater than `min`
///
/// ## Example
/// ```rust
/// use club_core::points::Points;
/// use club_core::validation::validate_max_points;
///
/// let p = Points::from_value;
/// assert!(validate_max_points(p(0), p(100)).is_ok());
/// assert!(validate_max_points(p(100), p(100)).is_err());
/// assert!(validate_max_points(p(0), p(0)).is_err());
/// ```
pub fn validate_max_points(min: Points, max: Points) -> ValidationResult<()> {
    if max.value() <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Max points".to_string(),
        });
    }

    if max <= min {
        return Err(ValidationError::MustExceed {
            field: "Max points".to_string(),
            other: "min points".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Voucher Field Validators
// =============================================================================

/// Validates a voucher catalog code.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 20 characters
/// - No whitespace inside the code
/// - No `-`: issued codes are `{code}-{suffix}`, so the catalog code must be
///   recoverable as the text before the first separator
pub fn validate_voucher_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "Code".to_string(),
        });
    }

    if code.chars().count() > MAX_VOUCHER_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "Code".to_string(),
            max: MAX_VOUCHER_CODE_LEN,
        });
    }

    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "Code".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    if code.contains(VOUCHER_CODE_SEPARATOR) {
        return Err(ValidationError::InvalidFormat {
            field: "Code".to_string(),
            reason: format!("must not contain '{}'", VOUCHER_CODE_SEPARATOR),
        });
    }

    Ok(())
}

/// Checks that no other catalog entry already uses `code`.
///
/// Comparison ignores case. `exclude_id` is the voucher being edited.
pub fn validate_voucher_code_unique(
    code: &str,
    exclude_id: Option<&str>,
    catalog: &[Voucher],
) -> ValidationResult<()> {
    let code = code.trim();
    let taken = catalog
        .iter()
        .filter(|v| Some(v.id.as_str()) != exclude_id)
        .any(|v| v.code.eq_ignore_ascii_case(code));

    if taken {
        return Err(ValidationError::Duplicate {
            field: "Code".to_string(),
            value: code.to_string(),
        });
    }

    Ok(())
}

/// Validates the discount value.
///
/// ## Rules
/// - Must be a finite number greater than zero
/// - Percentage discounts cannot exceed 100
pub fn validate_discount_value(value: f64, discount_type: DiscountType) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "Discount value".to_string(),
        });
    }

    if discount_type == DiscountType::Percentage && value > 100.0 {
        return Err(ValidationError::OutOfRange {
            field: "Discount value".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates the point cost of a voucher (`>= 0`; zero means free).
pub fn validate_request_points(points: Points) -> ValidationResult<()> {
    if points.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "Request points".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an optional expiry date; when present it cannot be in the past.
pub fn validate_expiry_date(expiry: Option<NaiveDate>, today: NaiveDate) -> ValidationResult<()> {
    match expiry {
        Some(date) if date < today => Err(ValidationError::InvalidFormat {
            field: "Expiry date".to_string(),
            reason: format!("{} is in the past", date),
        }),
        _ => Ok(()),
    }
}

/// Validates the optional tier restriction against the current tier list.
pub fn validate_voucher_tier(tier_name: Option<&str>, tiers: &[Tier]) -> ValidationResult<()> {
    let Some(name) = tier_name else {
        return Ok(());
    };

    if tiers.iter().any(|t| t.tier_name == name) {
        Ok(())
    } else {
        Err(ValidationError::UnknownReference {
            field: "Tier".to_string(),
            value: name.to_string(),
        })
    }
}

// =============================================================================
// Voucher Form
// =============================================================================

/// Fields of the voucher form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoucherField {
    Code,
    DiscountValue,
    RequestPoints,
    ExpiryDate,
    TierName,
}

impl FormField for VoucherField {
    fn wire_name(&self) -> &'static str {
        match self {
            VoucherField::Code => "code",
            VoucherField::DiscountValue => "discountValue",
            VoucherField::RequestPoints => "requestPoints",
            VoucherField::ExpiryDate => "expiryDate",
            VoucherField::TierName => "tierName",
        }
    }
}

/// Outcome of [`validate_voucher`].
pub type VoucherValidation = FieldErrors<VoucherField>;

/// Validates a voucher form before it is sent to the backend.
///
/// `exclude_id` is the voucher being edited (skipped in the duplicate check),
/// `catalog` is the current voucher list, `tiers` the current tier list.
/// Uniqueness is only checked once the code itself is well-formed.
pub fn validate_voucher(
    input: &VoucherInput,
    exclude_id: Option<&str>,
    catalog: &[Voucher],
    tiers: &[Tier],
    today: NaiveDate,
) -> VoucherValidation {
    let input = input.trimmed();
    let mut result = VoucherValidation::default();

    match validate_voucher_code(&input.code) {
        Ok(()) => result.check(
            VoucherField::Code,
            validate_voucher_code_unique(&input.code, exclude_id, catalog),
        ),
        Err(err) => result.insert(VoucherField::Code, err),
    }

    result.check(
        VoucherField::DiscountValue,
        validate_discount_value(input.discount_value, input.discount_type),
    );
    result.check(
        VoucherField::RequestPoints,
        validate_request_points(input.request_points),
    );
    result.check(
        VoucherField::ExpiryDate,
        validate_expiry_date(input.expiry_date, today),
    );
    result.check(
        VoucherField::TierName,
        validate_voucher_tier(input.tier_name.as_deref(), tiers),
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_validate_tier_name() {
        assert!(validate_tier_name("Gold").is_ok());
        assert!(validate_tier_name(&"A".repeat(30)).is_ok());

        assert!(validate_tier_name("").is_err());
        assert!(validate_tier_name("   ").is_err());
        assert!(validate_tier_name(&"A".repeat(31)).is_err());
    }

    #[test]
    fn test_tier_name_length_counts_characters() {
        // 30 multi-byte characters are still within the limit
        assert!(validate_tier_name(&"é".repeat(30)).is_ok());
    }

    #[test]
    fn test_validate_points() {
        let p = Points::from_value;
        assert!(validate_min_points(p(0)).is_ok());
        assert!(validate_min_points(p(-1)).is_err());

        assert!(validate_max_points(p(0), p(1)).is_ok());
        assert!(matches!(
            validate_max_points(p(-10), p(0)),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_max_points(p(200), p(150)),
            Err(ValidationError::MustExceed { .. })
        ));
    }

    #[test]
    fn test_validate_voucher_code() {
        assert!(validate_voucher_code("FREE1").is_ok());
        assert!(validate_voucher_code("").is_err());
        assert!(validate_voucher_code("FREE 1").is_err());
        assert!(validate_voucher_code(&"X".repeat(21)).is_err());
    }

    #[test]
    fn test_voucher_code_rejects_separator() {
        // "SUMMER-FREE-abc123" would be matched back to "SUMMER"
        assert!(matches!(
            validate_voucher_code("SUMMER-FREE"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_voucher_code("SUMMERFREE").is_ok());
        assert_eq!(
            crate::redemption::voucher_code_prefix("SUMMERFREE-abc123"),
            "SUMMERFREE"
        );

        let input = VoucherInput::new("SUMMER-FREE", 5.0, 0);
        let result = validate_voucher(&input, None, &[], &[], today());
        assert!(result.error(VoucherField::Code).is_some());
    }

    #[test]
    fn test_code_uniqueness_skips_edited_voucher() {
        let catalog = vec![Voucher::new("v1", "FREE1", 0)];

        assert!(validate_voucher_code_unique("free1", None, &catalog).is_err());
        assert!(validate_voucher_code_unique("FREE1", Some("v1"), &catalog).is_ok());
        assert!(validate_voucher_code_unique("FREE2", None, &catalog).is_ok());
    }

    #[test]
    fn test_validate_discount_value() {
        assert!(validate_discount_value(5.0, DiscountType::Amount).is_ok());
        assert!(validate_discount_value(250.0, DiscountType::Amount).is_ok());
        assert!(validate_discount_value(100.0, DiscountType::Percentage).is_ok());

        assert!(validate_discount_value(0.0, DiscountType::Amount).is_err());
        assert!(validate_discount_value(f64::NAN, DiscountType::Amount).is_err());
        assert!(validate_discount_value(100.5, DiscountType::Percentage).is_err());
    }

    #[test]
    fn test_validate_expiry_date() {
        assert!(validate_expiry_date(None, today()).is_ok());
        assert!(validate_expiry_date(Some(today()), today()).is_ok());
        assert!(validate_expiry_date(today().pred_opt(), today()).is_err());
    }

    #[test]
    fn test_validate_voucher_collects_every_field() {
        let tiers = vec![Tier::new("t1", "Gold", 1000, 4999)];
        let input = VoucherInput {
            code: String::new(),
            discount_value: 0.0,
            discount_type: DiscountType::Amount,
            request_points: Points::from_value(-1),
            expiry_date: today().pred_opt(),
            tier_name: Some("Platinum".to_string()),
        };

        let result = validate_voucher(&input, None, &[], &tiers, today());
        assert!(!result.is_valid());
        assert_eq!(result.len(), 5);
        assert_eq!(result.message(VoucherField::Code), "Code is required");
        assert_eq!(
            result.messages().get("tierName").map(String::as_str),
            Some("Tier 'Platinum' does not exist")
        );
    }

    #[test]
    fn test_validate_voucher_accepts_tier_voucher() {
        let tiers = vec![Tier::new("t1", "Gold", 1000, 4999)];
        let input = VoucherInput::new("GOLD10", 10.0, 0)
            .with_type(DiscountType::Percentage)
            .with_tier("Gold");

        let result = validate_voucher(&input, None, &[], &tiers, today());
        assert!(result.is_valid(), "{:?}", result.messages());
        assert_eq!(result.message(VoucherField::TierName), "");
    }
}
