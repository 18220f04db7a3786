//! # Domain Types
//!
//! Wire and view-model types shared by the admin screens, the member
//! redemption panel and the REST client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Tier       │   │     Voucher     │   │   Redemption    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  tierName       │◄──│  tierName?      │   │  voucherCode    │       │
//! │  │  minPoints      │   │  code ◄─────────┼───│  (CODE-suffix)  │       │
//! │  │  maxPoints      │   │  requestPoints  │   │  catalogVoucher │       │
//! │  │  active         │   │  discount       │   │  Id? ───────────┼──► id │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                       ┌─────────────────────┐                           │
//! │                       │ RedeemableVoucher   │  catalog fields           │
//! │                       │  + isRedeemed       │  + derived flag           │
//! │                       └─────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The JSON wire format uses camelCase field names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::collection::Listing;
use crate::points::Points;

fn default_true() -> bool {
    true
}

/// An absent list field is read like `null`: empty and flagged.
fn absent_list<T: serde::de::DeserializeOwned>() -> Listing<T> {
    Listing::from_value(serde_json::Value::Null)
}

// =============================================================================
// Tier
// =============================================================================

/// A membership level defined by an inclusive point range.
///
/// Inactive tiers are skipped when assigning new members but stay in the
/// list (and in overlap checks) for the members who already hold them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Server-assigned identifier.
    pub id: String,
    pub tier_name: String,
    pub benefits: String,
    pub min_points: Points,
    pub max_points: Points,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Tier {
    /// Creates an active tier with empty benefits.
    pub fn new(id: impl Into<String>, tier_name: impl Into<String>, min: i64, max: i64) -> Self {
        Tier {
            id: id.into(),
            tier_name: tier_name.into(),
            benefits: String::new(),
            min_points: Points::from_value(min),
            max_points: Points::from_value(max),
            active: true,
        }
    }

    pub fn with_benefits(mut self, benefits: impl Into<String>) -> Self {
        self.benefits = benefits.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Checks whether `points` falls inside this tier's closed range.
    pub fn contains(&self, points: Points) -> bool {
        self.min_points <= points && points <= self.max_points
    }

    /// Returns the editable fields, used to pre-fill the edit form.
    pub fn to_input(&self) -> TierInput {
        TierInput {
            tier_name: self.tier_name.clone(),
            benefits: self.benefits.clone(),
            min_points: self.min_points,
            max_points: self.max_points,
            active: self.active,
        }
    }
}

/// A tier as entered in the create/edit form (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TierInput {
    pub tier_name: String,
    pub benefits: String,
    pub min_points: Points,
    pub max_points: Points,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl TierInput {
    pub fn new(
        tier_name: impl Into<String>,
        benefits: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Self {
        TierInput {
            tier_name: tier_name.into(),
            benefits: benefits.into(),
            min_points: Points::from_value(min),
            max_points: Points::from_value(max),
            active: true,
        }
    }

    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(&self) -> Self {
        TierInput {
            tier_name: self.tier_name.trim().to_string(),
            benefits: self.benefits.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Request body for `setTierStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStatusUpdate {
    pub active: bool,
}

// =============================================================================
// Voucher
// =============================================================================

/// How a voucher's `discountValue` is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Fixed amount off.
    #[default]
    #[serde(alias = "AMOUNT")]
    Amount,
    /// Percentage off (0-100].
    #[serde(alias = "PERCENTAGE")]
    Percentage,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Amount => write!(f, "amount"),
            DiscountType::Percentage => write!(f, "percentage"),
        }
    }
}

/// A redeemable discount definition in the voucher catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: String,
    /// Catalog code, unique per catalog.
    pub code: String,
    pub discount_value: f64,
    pub discount_type: DiscountType,
    /// Cost in reward points. Zero means a one-time free voucher.
    #[serde(default)]
    pub request_points: Points,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    /// Tier this voucher is reserved for; `None` for general vouchers.
    #[serde(default)]
    pub tier_name: Option<String>,
}

impl Voucher {
    /// Creates a general (not tier-bound) amount voucher.
    pub fn new(id: impl Into<String>, code: impl Into<String>, request_points: i64) -> Self {
        Voucher {
            id: id.into(),
            code: code.into(),
            discount_value: 10.0,
            discount_type: DiscountType::Amount,
            request_points: Points::from_value(request_points),
            expiry_date: None,
            tier_name: None,
        }
    }

    /// Zero-cost vouchers can be redeemed once per member.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.request_points.is_zero()
    }

    /// Expired when the expiry date lies strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.map(|d| d < today).unwrap_or(false)
    }

    /// Returns the editable fields, used to pre-fill the edit form.
    pub fn to_input(&self) -> VoucherInput {
        VoucherInput {
            code: self.code.clone(),
            discount_value: self.discount_value,
            discount_type: self.discount_type,
            request_points: self.request_points,
            expiry_date: self.expiry_date,
            tier_name: self.tier_name.clone(),
        }
    }
}

/// A voucher as entered in the create/edit form (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherInput {
    pub code: String,
    pub discount_value: f64,
    pub discount_type: DiscountType,
    pub request_points: Points,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_name: Option<String>,
}

impl VoucherInput {
    pub fn new(code: impl Into<String>, discount_value: f64, request_points: i64) -> Self {
        VoucherInput {
            code: code.into(),
            discount_value,
            discount_type: DiscountType::Amount,
            request_points: Points::from_value(request_points),
            expiry_date: None,
            tier_name: None,
        }
    }

    pub fn with_type(mut self, discount_type: DiscountType) -> Self {
        self.discount_type = discount_type;
        self
    }

    pub fn with_tier(mut self, tier_name: impl Into<String>) -> Self {
        self.tier_name = Some(tier_name.into());
        self
    }

    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Copy with the code trimmed and a blank tier name treated as absent.
    pub fn trimmed(&self) -> Self {
        VoucherInput {
            code: self.code.trim().to_string(),
            tier_name: self
                .tier_name
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            ..self.clone()
        }
    }
}

// =============================================================================
// Redemption
// =============================================================================

/// Lifecycle of an issued voucher instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedemptionStatus {
    /// Issued and not yet used.
    Active,
    /// Applied to a purchase.
    Used,
    /// Past its expiry date.
    Expired,
}

impl Default for RedemptionStatus {
    fn default() -> Self {
        RedemptionStatus::Active
    }
}

/// Evidence that the member redeemed one instance of a catalog voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    /// Issued code, `"<catalog code>-<instance>"`.
    pub voucher_code: String,
    /// Typed link to the catalog entry, when the backend provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_voucher_id: Option<String>,
    #[serde(default)]
    pub status: RedemptionStatus,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub redeemed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub used_at: Option<DateTime<Utc>>,
}

impl Redemption {
    pub fn new(id: impl Into<String>, voucher_code: impl Into<String>) -> Self {
        Redemption {
            id: id.into(),
            voucher_code: voucher_code.into(),
            catalog_voucher_id: None,
            status: RedemptionStatus::Active,
            redeemed_at: None,
            used_at: None,
        }
    }

    pub fn with_catalog_id(mut self, voucher_id: impl Into<String>) -> Self {
        self.catalog_voucher_id = Some(voucher_id.into());
        self
    }

    pub fn with_status(mut self, status: RedemptionStatus) -> Self {
        self.status = status;
        self
    }

    /// Only active instances can be applied to a purchase.
    pub fn is_usable(&self) -> bool {
        self.status == RedemptionStatus::Active
    }
}

// =============================================================================
// View Models
// =============================================================================

/// Catalog entry plus the derived "already consumed" flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RedeemableVoucher {
    #[serde(flatten)]
    pub voucher: Voucher,
    pub is_redeemed: bool,
}

/// Member dashboard summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub tier_name: Option<String>,
    #[serde(default)]
    pub tier_point_balance: Points,
    #[serde(default)]
    pub reward_point_balance: Points,
    /// Vouchers this member may redeem (their tier's plus general ones).
    #[serde(default = "absent_list")]
    #[ts(as = "Vec<Voucher>")]
    pub redeemable_vouchers: Listing<Voucher>,
}

/// Response of `redeemVoucher` / `useVoucher`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RedeemReceipt {
    pub voucher_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataShapeError;
    use serde_json::json;

    #[test]
    fn test_tier_wire_format() {
        let tier: Tier = serde_json::from_value(json!({
            "id": "t1",
            "tierName": "Gold",
            "benefits": "Free parking",
            "minPoints": 1000,
            "maxPoints": 4999,
            "active": false
        }))
        .unwrap();

        assert_eq!(tier.tier_name, "Gold");
        assert_eq!(tier.min_points.value(), 1000);
        assert!(!tier.active);

        let back = serde_json::to_value(&tier).unwrap();
        assert_eq!(back["maxPoints"], 4999);
    }

    #[test]
    fn test_tier_active_defaults_to_true() {
        let tier: Tier = serde_json::from_value(json!({
            "id": "t1",
            "tierName": "Gold",
            "benefits": "x",
            "minPoints": 0,
            "maxPoints": 10
        }))
        .unwrap();
        assert!(tier.active);
    }

    #[test]
    fn test_tier_contains_is_inclusive() {
        let tier = Tier::new("t1", "Silver", 100, 200);
        assert!(tier.contains(Points::from_value(100)));
        assert!(tier.contains(Points::from_value(200)));
        assert!(!tier.contains(Points::from_value(201)));
    }

    #[test]
    fn test_discount_type_accepts_both_cases() {
        let a: DiscountType = serde_json::from_value(json!("percentage")).unwrap();
        let b: DiscountType = serde_json::from_value(json!("PERCENTAGE")).unwrap();
        assert_eq!(a, DiscountType::Percentage);
        assert_eq!(b, DiscountType::Percentage);
        assert_eq!(serde_json::to_value(a).unwrap(), json!("percentage"));
    }

    #[test]
    fn test_redemption_status_is_upper_case() {
        let r: Redemption = serde_json::from_value(json!({
            "id": "r1",
            "voucherCode": "FREE1-abc123",
            "status": "USED"
        }))
        .unwrap();
        assert_eq!(r.status, RedemptionStatus::Used);
        assert!(!r.is_usable());
        assert!(r.catalog_voucher_id.is_none());
    }

    #[test]
    fn test_voucher_expiry() {
        let mut voucher = Voucher::new("v1", "SPRING", 0);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(!voucher.is_expired(today));

        voucher.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 19);
        assert!(!voucher.is_expired(today));

        voucher.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 18);
        assert!(voucher.is_expired(today));
    }

    #[test]
    fn test_redeemable_voucher_flattens_catalog_fields() {
        let entry = RedeemableVoucher {
            voucher: Voucher::new("v1", "FREE1", 0),
            is_redeemed: true,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["code"], "FREE1");
        assert_eq!(value["isRedeemed"], true);
    }

    #[test]
    fn test_dashboard_tolerates_malformed_voucher_list() {
        let dashboard: Dashboard = serde_json::from_value(json!({
            "tierName": "Gold",
            "tierPointBalance": 1200,
            "rewardPointBalance": 30,
            "redeemableVouchers": {"unexpected": true}
        }))
        .unwrap();

        assert_eq!(dashboard.reward_point_balance.value(), 30);
        assert!(dashboard.redeemable_vouchers.items().is_empty());
        assert!(dashboard.redeemable_vouchers.issue().is_some());
    }

    #[test]
    fn test_dashboard_missing_voucher_list_is_flagged() {
        let dashboard: Dashboard = serde_json::from_value(json!({
            "tierName": "Gold",
            "rewardPointBalance": 30
        }))
        .unwrap();

        assert!(dashboard.redeemable_vouchers.is_empty());
        assert_eq!(
            dashboard.redeemable_vouchers.issue(),
            Some(&DataShapeError::NotAList { found: "null" })
        );
        assert!(dashboard.tier_point_balance.is_zero());
    }

    #[test]
    fn test_voucher_input_trimmed_drops_blank_tier() {
        let input = VoucherInput::new("  SPRING ", 5.0, 0).with_tier("  ");
        let trimmed = input.trimmed();
        assert_eq!(trimmed.code, "SPRING");
        assert!(trimmed.tier_name.is_none());
    }
}
