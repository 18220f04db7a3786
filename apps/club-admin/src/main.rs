//! # club-admin
//!
//! Command-line front end for the club backend.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  argv ──► clap ──► ClientConfig::load ──► ConfiguredToken               │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                          HttpClubApi ──► TierScreen / VoucherAdmin /    │
//! │                                          RedeemScreen                   │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                                   stdout (tables), stderr (logs)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging honours `RUST_LOG` (default `info`).

mod cli;
mod render;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use club_client::{
    ClientConfig, ClubApi, ConfiguredToken, FormOutcome, HttpClubApi, RedeemScreen, TierScreen,
    VoucherAdminScreen,
};

use club_core::Tier;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.clone()).context("Failed to load client config")?;
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    let credentials = Arc::new(ConfiguredToken::from_config(&config));

    match cli.command {
        Command::Login { token } => {
            let file = credentials
                .token_file()
                .context("No token file location available on this platform")?;
            file.store(&token).await?;
            println!("Signed in. Token stored in {}", file.path().display());
            Ok(())
        }
        Command::Logout => {
            let file = credentials
                .token_file()
                .context("No token file location available on this platform")?;
            if file.clear().await? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        command => {
            let api: Arc<dyn ClubApi> = Arc::new(HttpClubApi::new(&config, credentials)?);
            run(command, api).await
        }
    }
}

async fn run(command: Command, api: Arc<dyn ClubApi>) -> Result<()> {
    match command {
        // ---------------------------------------------------------------------
        // Tiers
        // ---------------------------------------------------------------------
        Command::Tiers => {
            let screen = TierScreen::new(api);
            screen.load().await?;
            print!("{}", render::tiers(&screen.sorted_by_min_points()));
            report_banner(screen.banner());
        }
        Command::AddTier { tier } => {
            submit_tier(api, &tier.to_input(), None).await?;
        }
        Command::EditTier { id, tier } => {
            submit_tier(api, &tier.to_input(), Some(&id)).await?;
        }
        Command::DeleteTier { id } => {
            let screen = TierScreen::new(api);
            screen.delete(&id).await?;
            report_banner(screen.banner());
        }
        Command::TierStatus { id, status } => {
            let screen = TierScreen::new(api);
            screen.set_status(&id, status.is_on()).await?;
            report_banner(screen.banner());
        }

        // ---------------------------------------------------------------------
        // Vouchers
        // ---------------------------------------------------------------------
        Command::Vouchers => {
            let screen = VoucherAdminScreen::new(api);
            screen.load().await?;
            let today = Local::now().date_naive();
            print!("{}", render::vouchers(&screen.vouchers(), today));
            report_banner(screen.banner());
        }
        Command::AddVoucher { voucher } => {
            submit_voucher(api, &voucher.to_input(), None).await?;
        }
        Command::EditVoucher { id, voucher } => {
            submit_voucher(api, &voucher.to_input(), Some(&id)).await?;
        }
        Command::DeleteVoucher { id } => {
            let screen = VoucherAdminScreen::new(api);
            screen.delete(&id).await?;
            report_banner(screen.banner());
        }

        // ---------------------------------------------------------------------
        // Member
        // ---------------------------------------------------------------------
        Command::Dashboard => {
            let screen = RedeemScreen::new(api.clone());
            screen.load().await?;
            print_dashboard(&screen, &member_tiers(&api).await);
        }
        Command::History => {
            let screen = RedeemScreen::new(api);
            screen.load().await?;
            print!("{}", render::history(&screen.history()));
            report_banner(screen.banner());
        }
        Command::Redeem { voucher_id } => {
            let screen = RedeemScreen::new(api.clone());
            screen.load().await?;
            let receipt = screen.redeem(&voucher_id).await?;
            info!(voucher_code = %receipt.voucher_code, "Redemption complete");
            print_dashboard(&screen, &member_tiers(&api).await);
        }
        Command::Use { redemption_id } => {
            let screen = RedeemScreen::new(api);
            screen.load().await?;
            screen.use_redemption(&redemption_id).await?;
            report_banner(screen.banner());
        }

        Command::Login { .. } | Command::Logout => bail!("Session commands do not use the API"),
    }
    Ok(())
}

/// Loads the tier list (the overlap check needs it) and submits the form.
async fn submit_tier(api: Arc<dyn ClubApi>, form: &club_core::TierInput, editing: Option<&str>) -> Result<()> {
    let screen = TierScreen::new(api);
    screen.load().await?;

    match screen.submit(form, editing).await? {
        FormOutcome::Saved => {
            report_banner(screen.banner());
            Ok(())
        }
        FormOutcome::Rejected(validation) => {
            eprint!("{}", render::field_errors(validation.messages()));
            bail!("Tier not saved")
        }
    }
}

/// Loads catalog and tiers (uniqueness and tier checks need them) and submits.
async fn submit_voucher(
    api: Arc<dyn ClubApi>,
    form: &club_core::VoucherInput,
    editing: Option<&str>,
) -> Result<()> {
    let screen = VoucherAdminScreen::new(api);
    screen.load().await?;

    let today = Local::now().date_naive();
    match screen.submit(form, editing, today).await? {
        FormOutcome::Saved => {
            report_banner(screen.banner());
            Ok(())
        }
        FormOutcome::Rejected(validation) => {
            eprint!("{}", render::field_errors(validation.messages()));
            bail!("Voucher not saved")
        }
    }
}

/// Tier ladder for the dashboard cross-check; empty when the caller may not list tiers.
async fn member_tiers(api: &Arc<dyn ClubApi>) -> Vec<Tier> {
    match api.list_tiers().await {
        Ok(listing) => listing.into_items(),
        Err(err) => {
            debug!(error = %err, "Tier list unavailable, skipping tier cross-check");
            Vec::new()
        }
    }
}

fn print_dashboard(screen: &RedeemScreen, tiers: &[Tier]) {
    print!(
        "{}",
        render::dashboard(
            screen.tier_name().as_deref(),
            screen.tier_points(),
            screen.balance(),
            &screen.rows(),
            tiers,
        )
    );
    report_banner(screen.banner());
}

fn report_banner(banner: Option<club_client::Banner>) {
    if let Some(banner) = banner {
        if banner.is_error() {
            eprintln!("{}", render::banner(&banner));
        } else {
            println!("{}", render::banner(&banner));
        }
    }
}
