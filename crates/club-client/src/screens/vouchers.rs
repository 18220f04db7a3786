//! Voucher catalog administration screen.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use club_core::validation::{validate_voucher, VoucherValidation};
use club_core::{CoreError, DataShapeError, Tier, Voucher, VoucherInput};

use crate::api::ClubApi;
use crate::error::{ClientError, ClientResult};
use crate::screens::{lock, Banner, FormOutcome};

#[derive(Debug, Default)]
struct VoucherState {
    vouchers: Vec<Voucher>,
    tiers: Vec<Tier>,
    banner: Option<Banner>,
}

/// Controller for the voucher catalog and its create/edit form.
///
/// Tiers are loaded alongside the catalog so the form can offer (and
/// validate) the tier a voucher is reserved for.
pub struct VoucherAdminScreen {
    api: Arc<dyn ClubApi>,
    state: Mutex<VoucherState>,
}

impl VoucherAdminScreen {
    pub fn new(api: Arc<dyn ClubApi>) -> Self {
        VoucherAdminScreen {
            api,
            state: Mutex::new(VoucherState::default()),
        }
    }

    /// Fetches the catalog and the tier list concurrently.
    pub async fn load(&self) -> ClientResult<()> {
        let (vouchers, tiers) = tokio::join!(self.api.list_vouchers(), self.api.list_tiers());

        let vouchers = match vouchers {
            Ok(listing) => listing,
            Err(err) => return self.fail("Failed to load vouchers", err),
        };
        let tiers = match tiers {
            Ok(listing) => listing,
            Err(err) => return self.fail("Failed to load tiers", err),
        };

        let issue: Option<DataShapeError> = vouchers.issue().or(tiers.issue()).cloned();

        let mut state = lock(&self.state);
        state.vouchers = vouchers.into_items();
        state.tiers = tiers.into_items();
        state.banner = issue.map(|issue| Banner::error(CoreError::from(issue).to_string()));

        debug!(
            vouchers = state.vouchers.len(),
            tiers = state.tiers.len(),
            "Voucher catalog loaded"
        );
        Ok(())
    }

    /// Validates and saves the form.
    ///
    /// New vouchers that name a tier are created under that tier; editing
    /// always goes through `update_voucher`.
    pub async fn submit(
        &self,
        form: &VoucherInput,
        editing: Option<&str>,
        today: NaiveDate,
    ) -> ClientResult<FormOutcome<VoucherValidation>> {
        let form = form.trimmed();

        let validation = {
            let state = lock(&self.state);
            if let Some(id) = editing {
                if !state.vouchers.iter().any(|v| v.id == id) {
                    return Err(CoreError::VoucherNotFound(id.to_string()).into());
                }
            }
            validate_voucher(&form, editing, &state.vouchers, &state.tiers, today)
        };

        if !validation.is_valid() {
            debug!(code = %form.code, errors = validation.len(), "Voucher form rejected");
            return Ok(FormOutcome::Rejected(validation));
        }

        let result = match (editing, form.tier_name.as_deref()) {
            (Some(id), _) => self.api.update_voucher(id, &form).await,
            (None, Some(tier_name)) => self.api.create_tier_voucher(tier_name, &form).await,
            (None, None) => self.api.create_voucher(&form).await,
        };
        if let Err(err) = result {
            return self.fail("Failed to save voucher", err);
        }

        info!(
            code = %form.code,
            voucher_id = ?editing,
            tier_name = ?form.tier_name,
            "Voucher saved"
        );
        self.reload_with(format!("Voucher {} saved", form.code)).await?;
        Ok(FormOutcome::Saved)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        if let Err(err) = self.api.delete_voucher(id).await {
            return self.fail("Failed to delete voucher", err);
        }
        info!(voucher_id = id, "Voucher deleted");
        self.reload_with("Voucher deleted").await
    }

    pub fn vouchers(&self) -> Vec<Voucher> {
        lock(&self.state).vouchers.clone()
    }

    /// Vouchers reserved for `tier_name`, or the general ones for `None`.
    pub fn vouchers_for_tier(&self, tier_name: Option<&str>) -> Vec<Voucher> {
        lock(&self.state)
            .vouchers
            .iter()
            .filter(|v| v.tier_name.as_deref() == tier_name)
            .cloned()
            .collect()
    }

    pub fn tiers(&self) -> Vec<Tier> {
        lock(&self.state).tiers.clone()
    }

    pub fn form_for(&self, id: &str) -> Option<VoucherInput> {
        lock(&self.state)
            .vouchers
            .iter()
            .find(|v| v.id == id)
            .map(Voucher::to_input)
    }

    pub fn banner(&self) -> Option<Banner> {
        lock(&self.state).banner.clone()
    }

    async fn reload_with(&self, message: impl Into<String>) -> ClientResult<()> {
        self.load().await?;
        Banner::offer_success(&mut lock(&self.state).banner, message);
        Ok(())
    }

    fn fail<T>(&self, context: &str, err: ClientError) -> ClientResult<T> {
        error!(error = %err, "{}", context);
        lock(&self.state).banner = Some(Banner::from_error(&err));
        Err(err)
    }
}
