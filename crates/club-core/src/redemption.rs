//! # Voucher Redemption Reconciler
//!
//! Merges the voucher catalog with the member's redemption history and
//! decides which "Redeem" buttons are enabled.
//!
//! ## Reconciliation Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  catalog (vouchers)          history (redemptions)                      │
//! │        │                            │                                   │
//! │        │        STEP 1              ▼                                   │
//! │        │   for each record: find its catalog entry                      │
//! │        │     • by catalogVoucherId when present                         │
//! │        │     • else by voucherCode prefix ("FREE1-abc123" → "FREE1")    │
//! │        │   entry is free (requestPoints == 0) → consumed set            │
//! │        │                            │                                   │
//! │        ▼        STEP 2              ▼                                   │
//! │   isRedeemed = free && consumed   (catalog order preserved)             │
//! │        │                                                                │
//! │        ▼        STEP 3                                                  │
//! │   actionable = !isRedeemed && (free || balance >= requestPoints)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paid vouchers are repeatable and never marked redeemed; only the point
//! balance gates them. The gate is advisory: the backend makes the final call.
//!
//! ## Per-Voucher State Machine
//! ```text
//!              redeem sent               success (free voucher)
//!  AVAILABLE ───────────────► PENDING ─────────────────────────► REDEEMED
//!      ▲                         │
//!      └─────────────────────────┘
//!        failure, or success on a paid voucher
//! ```
//!
//! After any successful redemption the caller refetches both lists and runs
//! [`reconcile`] again; nothing here mutates `isRedeemed` in place.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::collection::Listing;
use crate::error::{CoreError, CoreResult, DataShapeError};
use crate::points::Points;
use crate::types::{RedeemableVoucher, Redemption, Voucher};
use crate::VOUCHER_CODE_SEPARATOR;

// =============================================================================
// Step 1: Consumed Set
// =============================================================================

/// Catalog code part of an issued voucher code (text before the first `-`).
///
/// ## Example
/// ```rust
/// use club_core::redemption::voucher_code_prefix;
///
/// assert_eq!(voucher_code_prefix("FREE1-abc123"), "FREE1");
/// assert_eq!(voucher_code_prefix("FREE1"), "FREE1");
/// ```
pub fn voucher_code_prefix(code: &str) -> &str {
    code.split(VOUCHER_CODE_SEPARATOR).next().unwrap_or(code)
}

/// Catalog entries a redemption record refers to.
///
/// The typed id wins when present; otherwise every entry whose code equals
/// the record's code prefix matches.
fn referenced_entries<'a>(
    record: &'a Redemption,
    catalog: &'a [Voucher],
) -> impl Iterator<Item = &'a Voucher> + 'a {
    let prefix = voucher_code_prefix(&record.voucher_code);
    catalog
        .iter()
        .filter(move |voucher| match &record.catalog_voucher_id {
            Some(id) => voucher.id == *id,
            None => voucher.code == prefix,
        })
}

/// Ids of free catalog vouchers that appear in the history.
pub fn consumed_voucher_ids(catalog: &[Voucher], history: &[Redemption]) -> HashSet<String> {
    history
        .iter()
        .flat_map(|record| referenced_entries(record, catalog))
        .filter(|voucher| voucher.is_free())
        .map(|voucher| voucher.id.clone())
        .collect()
}

// =============================================================================
// Step 2: View Model
// =============================================================================

/// Builds the redeemable-voucher view model, in catalog order.
///
/// ## Example
/// ```rust
/// use club_core::redemption::reconcile;
/// use club_core::types::{Redemption, Voucher};
///
/// let catalog = vec![Voucher::new("v1", "FREE1", 0), Voucher::new("v2", "PAID", 50)];
/// let history = vec![Redemption::new("r1", "FREE1-abc123"), Redemption::new("r2", "PAID-x")];
///
/// let entries = reconcile(&catalog, &history);
/// assert!(entries[0].is_redeemed);
/// assert!(!entries[1].is_redeemed);
/// ```
pub fn reconcile(catalog: &[Voucher], history: &[Redemption]) -> Vec<RedeemableVoucher> {
    let consumed = consumed_voucher_ids(catalog, history);

    catalog
        .iter()
        .map(|voucher| RedeemableVoucher {
            is_redeemed: voucher.is_free() && consumed.contains(&voucher.id),
            voucher: voucher.clone(),
        })
        .collect()
}

/// Result of reconciling raw, possibly malformed, JSON responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub entries: Vec<RedeemableVoucher>,
    /// Data-shape problems to show as a banner.
    pub issues: Vec<DataShapeError>,
}

/// Reconciles JSON values straight from the API.
///
/// Anything that is not a list counts as an empty list; the problem is
/// reported in [`Reconciled::issues`] rather than returned as an error.
pub fn reconcile_raw(catalog: Value, history: Value) -> Reconciled {
    let catalog: Listing<Voucher> = Listing::from_value(catalog);
    let history: Listing<Redemption> = Listing::from_value(history);

    let issues = catalog
        .issue()
        .into_iter()
        .chain(history.issue())
        .cloned()
        .collect();

    Reconciled {
        entries: reconcile(catalog.items(), history.items()),
        issues,
    }
}

// =============================================================================
// Step 3: Eligibility
// =============================================================================

/// Whether the "Redeem" action is enabled for this entry.
#[inline]
pub fn is_actionable(entry: &RedeemableVoucher, balance: Points) -> bool {
    !entry.is_redeemed && (entry.voucher.is_free() || balance.covers(entry.voucher.request_points))
}

/// Like [`is_actionable`], with the reason when it is not.
pub fn check_redeemable(entry: &RedeemableVoucher, balance: Points) -> CoreResult<()> {
    if entry.is_redeemed {
        return Err(CoreError::NotRedeemable {
            code: entry.voucher.code.clone(),
            reason: "already redeemed".to_string(),
        });
    }

    if !entry.voucher.is_free() && !balance.covers(entry.voucher.request_points) {
        return Err(CoreError::NotRedeemable {
            code: entry.voucher.code.clone(),
            reason: format!(
                "requires {}, balance is {}",
                entry.voucher.request_points, balance
            ),
        });
    }

    Ok(())
}

// =============================================================================
// Phases and In-Flight Tracking
// =============================================================================

/// Client-observed state of one voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherPhase {
    Available,
    Pending,
    Redeemed,
}

impl VoucherPhase {
    /// Current phase of an entry, given whether a request for it is outstanding.
    pub fn of(entry: &RedeemableVoucher, pending: bool) -> Self {
        if pending {
            VoucherPhase::Pending
        } else if entry.is_redeemed {
            VoucherPhase::Redeemed
        } else {
            VoucherPhase::Available
        }
    }

    /// Phase once the outstanding request for a voucher costing
    /// `request_points` completes.
    pub fn after_redeem(success: bool, request_points: Points) -> Self {
        if success && request_points.is_zero() {
            VoucherPhase::Redeemed
        } else {
            VoucherPhase::Available
        }
    }
}

/// Voucher ids with a redemption request outstanding.
///
/// Plain data; the screen that owns it provides the locking.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: HashSet<String>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `voucher_id` as pending, unless it already is.
    pub fn begin(&mut self, voucher_id: &str) -> CoreResult<()> {
        if !self.ids.insert(voucher_id.to_string()) {
            return Err(CoreError::RedemptionInFlight {
                voucher_id: voucher_id.to_string(),
            });
        }
        Ok(())
    }

    /// Clears the pending mark. Returns false if there was none.
    pub fn finish(&mut self, voucher_id: &str) -> bool {
        self.ids.remove(voucher_id)
    }

    pub fn contains(&self, voucher_id: &str) -> bool {
        self.ids.contains(voucher_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One card of the member redemption panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRow {
    pub voucher: RedeemableVoucher,
    pub phase: VoucherPhase,
    /// Button enabled: eligible and not already pending.
    pub actionable: bool,
}

/// Reconciles and applies the eligibility gate and pending marks.
pub fn reconcile_with_balance(
    catalog: &[Voucher],
    history: &[Redemption],
    balance: Points,
    in_flight: &InFlight,
) -> Vec<VoucherRow> {
    reconcile(catalog, history)
        .into_iter()
        .map(|entry| {
            let pending = in_flight.contains(&entry.voucher.id);
            VoucherRow {
                phase: VoucherPhase::of(&entry, pending),
                actionable: !pending && is_actionable(&entry, balance),
                voucher: entry,
            }
        })
        .collect()
}
