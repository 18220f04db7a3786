//! Tier administration screen.
//!
//! Validation runs against the list this screen last fetched; only a valid
//! form reaches the backend, and every successful write is followed by a
//! full reload of the tier list.

use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use club_core::{validate_tier, CoreError, Tier, TierInput, TierValidation};

use crate::api::ClubApi;
use crate::error::{ClientError, ClientResult};
use crate::screens::{lock, Banner, FormOutcome};

#[derive(Debug, Default)]
struct TierState {
    tiers: Vec<Tier>,
    banner: Option<Banner>,
}

/// Controller for the tier list and the create/edit form.
pub struct TierScreen {
    api: Arc<dyn ClubApi>,
    state: Mutex<TierState>,
}

impl TierScreen {
    pub fn new(api: Arc<dyn ClubApi>) -> Self {
        TierScreen {
            api,
            state: Mutex::new(TierState::default()),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetches the tier list.
    ///
    /// A malformed response leaves the list empty and sets an error banner.
    /// A failed request keeps the previous list.
    pub async fn load(&self) -> ClientResult<()> {
        let listing = match self.api.list_tiers().await {
            Ok(listing) => listing,
            Err(err) => return self.fail("Failed to load tiers", err),
        };

        let issue = listing.issue().cloned();
        let mut state = lock(&self.state);
        state.tiers = listing.into_items();
        state.banner = issue.map(|issue| Banner::error(CoreError::from(issue).to_string()));

        debug!(count = state.tiers.len(), "Tiers loaded");
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates and saves the form.
    ///
    /// `editing` is the id of the tier being edited, `None` for a new tier.
    pub async fn submit(
        &self,
        form: &TierInput,
        editing: Option<&str>,
    ) -> ClientResult<FormOutcome<TierValidation>> {
        let form = form.trimmed();

        let validation = {
            let state = lock(&self.state);
            if let Some(id) = editing {
                if !state.tiers.iter().any(|t| t.id == id) {
                    return Err(CoreError::TierNotFound(id.to_string()).into());
                }
            }
            validate_tier(&form, editing, &state.tiers)
        };

        if !validation.is_valid() {
            debug!(
                tier_name = %form.tier_name,
                conflict = ?validation.conflict().map(|c| c.tier_name.as_str()),
                "Tier form rejected"
            );
            return Ok(FormOutcome::Rejected(validation));
        }

        let result = match editing {
            Some(id) => self.api.update_tier(id, &form).await,
            None => self.api.create_tier(&form).await,
        };
        if let Err(err) = result {
            return self.fail("Failed to save tier", err);
        }

        info!(tier_name = %form.tier_name, tier_id = ?editing, "Tier saved");
        self.reload_with(match editing {
            Some(_) => format!("Tier \"{}\" updated", form.tier_name),
            None => format!("Tier \"{}\" created", form.tier_name),
        })
        .await?;

        Ok(FormOutcome::Saved)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        if let Err(err) = self.api.delete_tier(id).await {
            return self.fail("Failed to delete tier", err);
        }
        info!(tier_id = id, "Tier deleted");
        self.reload_with("Tier deleted").await
    }

    /// Activates or deactivates a tier.
    pub async fn set_status(&self, id: &str, active: bool) -> ClientResult<()> {
        if let Err(err) = self.api.set_tier_status(id, active).await {
            return self.fail("Failed to change tier status", err);
        }
        info!(tier_id = id, active, "Tier status changed");
        self.reload_with(if active {
            "Tier activated"
        } else {
            "Tier deactivated"
        })
        .await
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Tiers in server order.
    pub fn tiers(&self) -> Vec<Tier> {
        lock(&self.state).tiers.clone()
    }

    /// Tiers ordered by lower bound, for display.
    pub fn sorted_by_min_points(&self) -> Vec<Tier> {
        let mut tiers = self.tiers();
        tiers.sort_by_key(|t| t.min_points);
        tiers
    }

    /// Pre-filled form for editing `id`.
    pub fn form_for(&self, id: &str) -> Option<TierInput> {
        lock(&self.state)
            .tiers
            .iter()
            .find(|t| t.id == id)
            .map(Tier::to_input)
    }

    pub fn banner(&self) -> Option<Banner> {
        lock(&self.state).banner.clone()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeClubApi;
    use club_core::TierField;

    fn ladder() -> Vec<Tier> {
        vec![
            Tier::new("t1", "Bronze", 0, 999).with_benefits("Welcome drink"),
            Tier::new("t2", "Silver", 1000, 4999).with_benefits("Free parking"),
        ]
    }

    async fn screen(api: Arc<FakeClubApi>) -> TierScreen {
        let screen = TierScreen::new(api);
        screen.load().await.unwrap();
        screen
    }

    #[tokio::test]
    async fn test_load_lists_tiers() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api).await;
        assert_eq!(screen.tiers().len(), 2);
        assert!(screen.banner().is_none());
    }

    #[tokio::test]
    async fn test_non_json_body_empties_list_with_banner() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;
        assert_eq!(screen.tiers().len(), 2);

        api.state().tiers_body = Some("<html>Bad Gateway</html>".to_string());
        screen.load().await.unwrap();

        assert!(screen.tiers().is_empty());
        let banner = screen.banner().unwrap();
        assert!(banner.is_error());
        assert!(banner.message.contains("non-JSON"));
    }

    #[tokio::test]
    async fn test_overlapping_tier_is_not_sent() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        let outcome = screen
            .submit(&TierInput::new("Mixed", "Stuff", 500, 1500), None)
            .await
            .unwrap();

        match outcome {
            FormOutcome::Rejected(validation) => {
                let conflict = validation.conflict().unwrap();
                assert_eq!(conflict.tier_name, "Bronze");
                assert_eq!(conflict.min_points.value(), 0);
                assert_eq!(conflict.max_points.value(), 999);
                assert!(!validation.message(TierField::Range).is_empty());
            }
            FormOutcome::Saved => panic!("overlapping tier was accepted"),
        }
        assert_eq!(api.count("create_tier"), 0);
    }

    #[tokio::test]
    async fn test_valid_tier_is_created_and_list_refetched() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        let outcome = screen
            .submit(&TierInput::new("  Gold ", "Lounge access", 5000, 9999), None)
            .await
            .unwrap();

        assert!(outcome.is_saved());
        assert_eq!(api.count("create_tier"), 1);
        assert_eq!(api.count("list_tiers"), 2);

        let tiers = screen.tiers();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[2].tier_name, "Gold");
        assert_eq!(
            screen.banner(),
            Some(Banner::success("Tier \"Gold\" created"))
        );
    }

    #[tokio::test]
    async fn test_editing_does_not_conflict_with_itself() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        let mut form = screen.form_for("t2").unwrap();
        form.max_points = 5999.into();
        let outcome = screen.submit(&form, Some("t2")).await.unwrap();

        assert!(outcome.is_saved());
        assert_eq!(api.count("update_tier"), 1);
        assert_eq!(screen.tiers()[1].max_points.value(), 5999);
    }

    #[tokio::test]
    async fn test_editing_unknown_tier_fails() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        let err = screen
            .submit(&TierInput::new("Ghost", "-", 6000, 7000), Some("t9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::TierNotFound(_))));
        assert_eq!(api.count("update_tier"), 0);
    }

    #[tokio::test]
    async fn test_server_error_sets_banner() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        api.fail_next(ClientError::Http {
            status: 409,
            message: Some("Tier name already exists".into()),
        });
        let err = screen
            .submit(&TierInput::new("Gold", "Lounge", 5000, 9999), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Http { status: 409, .. }));
        assert_eq!(
            screen.banner(),
            Some(Banner::error("Tier name already exists"))
        );
        // No refetch after a failed write
        assert_eq!(api.count("list_tiers"), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_list() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        api.fail_next(ClientError::Timeout);
        assert!(screen.load().await.is_err());
        assert_eq!(screen.tiers().len(), 2);
        assert!(screen.banner().unwrap().is_error());

        // Retry clears the banner
        screen.load().await.unwrap();
        assert!(screen.banner().is_none());
    }

    #[tokio::test]
    async fn test_delete_and_status_refetch() {
        let api = Arc::new(FakeClubApi::new().with_tiers(ladder()));
        let screen = screen(api.clone()).await;

        screen.set_status("t1", false).await.unwrap();
        assert!(!screen.tiers()[0].active);

        screen.delete("t2").await.unwrap();
        assert_eq!(screen.tiers().len(), 1);
        assert_eq!(api.count("list_tiers"), 3);
    }

    #[tokio::test]
    async fn test_sorted_view() {
        let api = Arc::new(FakeClubApi::new().with_tiers(vec![
            Tier::new("t2", "Silver", 1000, 4999),
            Tier::new("t1", "Bronze", 0, 999),
        ]));
        let screen = screen(api).await;

        let names: Vec<_> = screen
            .sorted_by_min_points()
            .into_iter()
            .map(|t| t.tier_name)
            .collect();
        assert_eq!(names, ["Bronze", "Silver"]);
    }
}
