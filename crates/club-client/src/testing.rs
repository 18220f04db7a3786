//! In-memory [`ClubApi`] for controller tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use club_core::redemption::voucher_code_prefix;
use club_core::{
    Dashboard, Listing, Points, RedeemReceipt, Redemption, RedemptionStatus, Tier,
    TierInput, Voucher, VoucherInput,
};

use crate::api::ClubApi;
use crate::error::{ClientError, ClientResult};

#[derive(Default)]
pub(crate) struct FakeState {
    pub tiers: Vec<Tier>,
    pub vouchers: Vec<Voucher>,
    pub dashboard: Dashboard,
    pub redemptions: Vec<Redemption>,
    /// Operation names in call order.
    pub calls: Vec<String>,
    /// Returned (once) by the next call.
    pub fail_next: Option<ClientError>,
    /// Returned (once) by the next call of the named operation.
    pub fail_on: Option<(&'static str, ClientError)>,
    /// When set, `get_dashboard` waits for a notification before answering.
    pub dashboard_gate: Option<Arc<Notify>>,
    /// Makes `list_my_redemptions` answer with a non-list body.
    pub malformed_history: bool,
    /// Raw 2xx body returned by `list_tiers` instead of `tiers`.
    pub tiers_body: Option<String>,
    /// Redemptions carry the typed catalog id.
    pub typed_references: bool,
    next_id: u32,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub(crate) struct FakeClubApi {
    state: Mutex<FakeState>,
    /// When set, `redeem_voucher` waits for a notification before answering.
    pub redeem_gate: Option<Arc<Notify>>,
}

impl FakeClubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tiers(self, tiers: Vec<Tier>) -> Self {
        self.state().tiers = tiers;
        self
    }

    pub fn with_vouchers(self, vouchers: Vec<Voucher>) -> Self {
        self.state().vouchers = vouchers;
        self
    }

    pub fn with_member(self, balance: i64, catalog: Vec<Voucher>) -> Self {
        {
            let mut state = self.state();
            state.dashboard.tier_name = Some("Gold".to_string());
            state.dashboard.tier_point_balance = Points::from_value(1200);
            state.dashboard.reward_point_balance = Points::from_value(balance);
            state.dashboard.redeemable_vouchers = Listing::from_items(catalog);
        }
        self
    }

    pub fn with_redemptions(self, redemptions: Vec<Redemption>) -> Self {
        self.state().redemptions = redemptions;
        self
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.redeem_gate = Some(gate);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == op).count()
    }

    pub fn fail_next(&self, err: ClientError) {
        self.state().fail_next = Some(err);
    }

    fn enter(&self, op: &str) -> ClientResult<()> {
        let mut state = self.state();
        state.calls.push(op.to_string());
        if state.fail_on.as_ref().is_some_and(|(target, _)| *target == op) {
            if let Some((_, err)) = state.fail_on.take() {
                return Err(err);
            }
        }
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn http(status: u16, message: &str) -> ClientError {
    ClientError::Http {
        status,
        message: Some(message.to_string()),
    }
}

fn to_tier(id: String, data: &TierInput) -> Tier {
    Tier {
        id,
        tier_name: data.tier_name.clone(),
        benefits: data.benefits.clone(),
        min_points: data.min_points,
        max_points: data.max_points,
        active: data.active,
    }
}

fn to_voucher(id: String, data: &VoucherInput) -> Voucher {
    Voucher {
        id,
        code: data.code.clone(),
        discount_value: data.discount_value,
        discount_type: data.discount_type,
        request_points: data.request_points,
        expiry_date: data.expiry_date,
        tier_name: data.tier_name.clone(),
    }
}

#[async_trait]
impl ClubApi for FakeClubApi {
    async fn list_tiers(&self) -> ClientResult<Listing<Tier>> {
        self.enter("list_tiers")?;
        let state = self.state();
        if let Some(body) = &state.tiers_body {
            return Ok(Listing::from_body(body));
        }
        Ok(Listing::from_items(state.tiers.clone()))
    }

    async fn create_tier(&self, data: &TierInput) -> ClientResult<()> {
        self.enter("create_tier")?;
        let mut state = self.state();
        let id = state.next_id("t");
        state.tiers.push(to_tier(id, data));
        Ok(())
    }

    async fn update_tier(&self, id: &str, data: &TierInput) -> ClientResult<()> {
        self.enter("update_tier")?;
        let mut state = self.state();
        let tier = state
            .tiers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| http(404, "Tier not found"))?;
        *tier = to_tier(id.to_string(), data);
        Ok(())
    }

    async fn delete_tier(&self, id: &str) -> ClientResult<()> {
        self.enter("delete_tier")?;
        self.state().tiers.retain(|t| t.id != id);
        Ok(())
    }

    async fn set_tier_status(&self, id: &str, active: bool) -> ClientResult<()> {
        self.enter("set_tier_status")?;
        let mut state = self.state();
        let tier = state
            .tiers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| http(404, "Tier not found"))?;
        tier.active = active;
        Ok(())
    }

    async fn list_vouchers(&self) -> ClientResult<Listing<Voucher>> {
        self.enter("list_vouchers")?;
        Ok(Listing::from_items(self.state().vouchers.clone()))
    }

    async fn create_voucher(&self, data: &VoucherInput) -> ClientResult<()> {
        self.enter("create_voucher")?;
        let mut state = self.state();
        let id = state.next_id("v");
        state.vouchers.push(to_voucher(id, data));
        Ok(())
    }

    async fn create_tier_voucher(&self, tier_name: &str, data: &VoucherInput) -> ClientResult<()> {
        self.enter("create_tier_voucher")?;
        let mut state = self.state();
        let id = state.next_id("v");
        let mut voucher = to_voucher(id, data);
        voucher.tier_name = Some(tier_name.to_string());
        state.vouchers.push(voucher);
        Ok(())
    }

    async fn update_voucher(&self, id: &str, data: &VoucherInput) -> ClientResult<()> {
        self.enter("update_voucher")?;
        let mut state = self.state();
        let voucher = state
            .vouchers
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| http(404, "Voucher not found"))?;
        *voucher = to_voucher(id.to_string(), data);
        Ok(())
    }

    async fn delete_voucher(&self, id: &str) -> ClientResult<()> {
        self.enter("delete_voucher")?;
        self.state().vouchers.retain(|v| v.id != id);
        Ok(())
    }

    async fn get_dashboard(&self) -> ClientResult<Dashboard> {
        self.enter("get_dashboard")?;
        let gate = self.state().dashboard_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.state().dashboard.clone())
    }

    async fn list_my_redemptions(&self) -> ClientResult<Listing<Redemption>> {
        self.enter("list_my_redemptions")?;
        let state = self.state();
        if state.malformed_history {
            return Ok(Listing::from_value(serde_json::json!({"content": []})));
        }
        Ok(Listing::from_items(state.redemptions.clone()))
    }

    async fn redeem_voucher(&self, voucher_id: &str) -> ClientResult<RedeemReceipt> {
        self.enter("redeem_voucher")?;
        if let Some(gate) = &self.redeem_gate {
            gate.notified().await;
        }

        let mut state = self.state();
        let voucher = state
            .dashboard
            .redeemable_vouchers
            .items()
            .iter()
            .find(|v| v.id == voucher_id)
            .cloned()
            .ok_or_else(|| http(404, "Voucher not found"))?;

        let already = state
            .redemptions
            .iter()
            .any(|r| voucher_code_prefix(&r.voucher_code) == voucher.code);
        if voucher.is_free() && already {
            return Err(http(409, "Voucher already redeemed"));
        }
        if !state.dashboard.reward_point_balance.covers(voucher.request_points) {
            return Err(http(400, "Insufficient points"));
        }

        state.dashboard.reward_point_balance -= voucher.request_points;
        let id = state.next_id("r");
        let mut record = Redemption::new(id.clone(), format!("{}-{}", voucher.code, id));
        if state.typed_references {
            record = record.with_catalog_id(voucher.id.clone());
        }
        let receipt = RedeemReceipt {
            voucher_code: record.voucher_code.clone(),
        };
        state.redemptions.push(record);
        Ok(receipt)
    }

    async fn use_voucher(&self, redemption_id: &str) -> ClientResult<RedeemReceipt> {
        self.enter("use_voucher")?;
        let mut state = self.state();
        let record = state
            .redemptions
            .iter_mut()
            .find(|r| r.id == redemption_id)
            .ok_or_else(|| http(404, "Redemption not found"))?;
        if record.status != RedemptionStatus::Active {
            return Err(http(409, "Voucher already used"));
        }
        record.status = RedemptionStatus::Used;
        Ok(RedeemReceipt {
            voucher_code: record.voucher_code.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use club_core::DataShapeError;

    #[tokio::test]
    async fn test_malformed_history_is_flagged() {
        let api = FakeClubApi::new();
        api.state().malformed_history = true;

        let listing = api.list_my_redemptions().await.unwrap();
        assert!(listing.is_empty());
        assert!(matches!(
            listing.issue(),
            Some(DataShapeError::NotAList { found: "an object" })
        ));
    }

    #[tokio::test]
    async fn test_fail_on_targets_one_operation() {
        let api = FakeClubApi::new();
        api.state().fail_on = Some(("list_vouchers", ClientError::Timeout));

        assert!(api.list_tiers().await.is_ok());
        assert!(api.list_vouchers().await.is_err());
        assert!(api.list_vouchers().await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let api = FakeClubApi::new();
        api.fail_next(ClientError::Timeout);

        assert!(api.list_tiers().await.is_err());
        assert!(api.list_tiers().await.is_ok());
        assert_eq!(api.count("list_tiers"), 2);
    }
}
