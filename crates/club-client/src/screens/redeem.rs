//! # Member Redemption Screen
//!
//! Shows the member's redeemable vouchers with their derived state and runs
//! redemptions.
//!
//! ## Redeem Flow
//! ```text
//! redeem(voucher_id)
//!      │
//!      ├── pending already? ─────────► Err(RedemptionInFlight)   no request
//!      ├── not actionable? ──────────► Err(NotRedeemable)        no request
//!      │
//!      ▼
//! InFlight::begin ──► ClubApi::redeem_voucher
//!                              │
//!                 ┌────────────┴────────────┐
//!                 ▼ ok                      ▼ err
//!        load() (dashboard + history)   InFlight::finish
//!        InFlight::finish               error banner
//!        reconcile from scratch         voucher back to AVAILABLE
//! ```
//!
//! `isRedeemed` is never flipped locally: after a successful redemption the
//! dashboard and history are fetched again and reconciled from scratch. The
//! voucher stays PENDING until that refetch has landed, so the stale history
//! can never offer a free voucher a second time.
//!
//! After [`RedeemScreen::unmount`] results of requests still in flight are
//! dropped without touching the screen state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use club_core::redemption::{check_redeemable, reconcile_with_balance};
use club_core::{
    reconcile, CoreError, DataShapeError, InFlight, Points, RedeemReceipt, Redemption, Voucher,
    VoucherPhase, VoucherRow,
};

use crate::api::ClubApi;
use crate::error::{ClientError, ClientResult};
use crate::screens::{lock, Banner};

#[derive(Debug, Default)]
struct RedeemState {
    tier_name: Option<String>,
    tier_points: Points,
    balance: Points,
    catalog: Vec<Voucher>,
    history: Vec<Redemption>,
    in_flight: InFlight,
    banner: Option<Banner>,
}

/// Controller for the member's voucher panel.
pub struct RedeemScreen {
    api: Arc<dyn ClubApi>,
    state: Mutex<RedeemState>,
    mounted: AtomicBool,
}

impl RedeemScreen {
    pub fn new(api: Arc<dyn ClubApi>) -> Self {
        RedeemScreen {
            api,
            state: Mutex::new(RedeemState::default()),
            mounted: AtomicBool::new(true),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stops every later result from reaching the screen state.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        debug!("Redeem screen unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Fetches the dashboard and redemption history concurrently.
    pub async fn load(&self) -> ClientResult<()> {
        let (dashboard, history) = tokio::join!(
            self.api.get_dashboard(),
            self.api.list_my_redemptions()
        );

        if !self.is_mounted() {
            debug!("Discarding dashboard for unmounted screen");
            return Ok(());
        }

        let dashboard = match dashboard {
            Ok(dashboard) => dashboard,
            Err(err) => return self.fail("Failed to load dashboard", err),
        };
        let history = match history {
            Ok(history) => history,
            Err(err) => return self.fail("Failed to load redemption history", err),
        };

        let issues: Vec<DataShapeError> = dashboard
            .redeemable_vouchers
            .issue()
            .into_iter()
            .chain(history.issue())
            .cloned()
            .collect();

        let mut state = lock(&self.state);
        state.tier_name = dashboard.tier_name;
        state.tier_points = dashboard.tier_point_balance;
        state.balance = dashboard.reward_point_balance;
        state.catalog = dashboard.redeemable_vouchers.into_items();
        state.history = history.into_items();
        state.banner = issues
            .into_iter()
            .next()
            .map(|issue| Banner::error(CoreError::from(issue).to_string()));

        debug!(
            vouchers = state.catalog.len(),
            redemptions = state.history.len(),
            balance = state.balance.value(),
            "Member vouchers loaded"
        );
        Ok(())
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Redeems one catalog voucher.
    ///
    /// Rejected locally, without a request, while a redemption of the same
    /// voucher is outstanding or when the voucher is not actionable.
    pub async fn redeem(&self, voucher_id: &str) -> ClientResult<RedeemReceipt> {
        let cost = {
            let mut state = lock(&self.state);
            if state.in_flight.contains(voucher_id) {
                debug!(voucher_id, "Redemption already in flight");
                return Err(CoreError::RedemptionInFlight {
                    voucher_id: voucher_id.to_string(),
                }
                .into());
            }

            let entry = reconcile(&state.catalog, &state.history)
                .into_iter()
                .find(|entry| entry.voucher.id == voucher_id)
                .ok_or_else(|| CoreError::VoucherNotFound(voucher_id.to_string()))?;
            check_redeemable(&entry, state.balance)?;

            state.in_flight.begin(voucher_id)?;
            entry.voucher.request_points
        };

        info!(voucher_id, "Redeeming voucher");
        let receipt = match self.api.redeem_voucher(voucher_id).await {
            Ok(receipt) => receipt,
            Err(err) => {
                lock(&self.state).in_flight.finish(voucher_id);
                return self.fail("Failed to redeem voucher", err);
            }
        };
        info!(voucher_id, voucher_code = %receipt.voucher_code, "Voucher redeemed");

        // Still pending while the refetch runs
        let reloaded = self
            .reload_with(format!("Redeemed voucher {}", receipt.voucher_code))
            .await;
        lock(&self.state).in_flight.finish(voucher_id);
        reloaded?;

        let expected = VoucherPhase::after_redeem(true, cost);
        let observed = self.phase(voucher_id);
        if self.is_mounted() && observed.is_some_and(|phase| phase != expected) {
            warn!(
                voucher_id,
                ?expected,
                ?observed,
                "Refetched history disagrees with the redemption"
            );
        }
        Ok(receipt)
    }

    /// Marks an issued voucher instance as used.
    pub async fn use_redemption(&self, redemption_id: &str) -> ClientResult<RedeemReceipt> {
        {
            let state = lock(&self.state);
            let record = state
                .history
                .iter()
                .find(|r| r.id == redemption_id)
                .ok_or_else(|| CoreError::VoucherNotFound(redemption_id.to_string()))?;
            if !record.is_usable() {
                return Err(CoreError::NotRedeemable {
                    code: record.voucher_code.clone(),
                    reason: "already used or expired".to_string(),
                }
                .into());
            }
        }

        match self.api.use_voucher(redemption_id).await {
            Ok(receipt) => {
                info!(redemption_id, voucher_code = %receipt.voucher_code, "Voucher used");
                self.reload_with(format!("Voucher {} used", receipt.voucher_code))
                    .await?;
                Ok(receipt)
            }
            Err(err) => self.fail("Failed to use voucher", err),
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Voucher cards in catalog order, with phase and button state.
    pub fn rows(&self) -> Vec<VoucherRow> {
        let state = lock(&self.state);
        reconcile_with_balance(&state.catalog, &state.history, state.balance, &state.in_flight)
    }

    pub fn balance(&self) -> Points {
        lock(&self.state).balance
    }

    pub fn tier_points(&self) -> Points {
        lock(&self.state).tier_points
    }

    pub fn tier_name(&self) -> Option<String> {
        lock(&self.state).tier_name.clone()
    }

    pub fn history(&self) -> Vec<Redemption> {
        lock(&self.state).history.clone()
    }

    /// Phase of one catalog voucher, `None` if it is not in the catalog.
    pub fn phase(&self, voucher_id: &str) -> Option<VoucherPhase> {
        self.rows()
            .into_iter()
            .find(|row| row.voucher.voucher.id == voucher_id)
            .map(|row| row.phase)
    }

    pub fn is_pending(&self, voucher_id: &str) -> bool {
        lock(&self.state).in_flight.contains(voucher_id)
    }

    pub fn banner(&self) -> Option<Banner> {
        lock(&self.state).banner.clone()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn reload_with(&self, message: impl Into<String>) -> ClientResult<()> {
        self.load().await?;
        if self.is_mounted() {
            Banner::offer_success(&mut lock(&self.state).banner, message);
        }
        Ok(())
    }

    fn fail<T>(&self, context: &str, err: ClientError) -> ClientResult<T> {
        error!(error = %err, "{}", context);
        if self.is_mounted() {
            lock(&self.state).banner = Some(Banner::from_error(&err));
        }
        Err(err)
    }
}
