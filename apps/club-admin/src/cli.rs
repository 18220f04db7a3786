//! Command-line definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use club_core::{DiscountType, TierInput, VoucherInput};

/// Club tiers, vouchers and redemptions from the terminal.
#[derive(Debug, Parser)]
#[command(name = "club-admin", version)]
#[command(about = "Manage club tiers and vouchers, redeem member vouchers", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Tiers
    // -------------------------------------------------------------------------
    /// List tiers ordered by minimum points.
    Tiers,

    /// Create a tier.
    #[command(name = "add-tier", allow_negative_numbers = true)]
    AddTier {
        #[command(flatten)]
        tier: TierArgs,
    },

    /// Replace a tier's fields.
    #[command(name = "edit-tier", allow_negative_numbers = true)]
    EditTier {
        id: String,
        #[command(flatten)]
        tier: TierArgs,
    },

    #[command(name = "delete-tier")]
    DeleteTier { id: String },

    /// Activate or deactivate a tier.
    #[command(name = "tier-status")]
    TierStatus { id: String, status: Switch },

    // -------------------------------------------------------------------------
    // Vouchers
    // -------------------------------------------------------------------------
    /// List the voucher catalog.
    Vouchers,

    /// Create a voucher, under a tier when --tier is given.
    #[command(name = "add-voucher", allow_negative_numbers = true)]
    AddVoucher {
        #[command(flatten)]
        voucher: VoucherArgs,
    },

    /// Replace a voucher's fields.
    #[command(name = "edit-voucher", allow_negative_numbers = true)]
    EditVoucher {
        id: String,
        #[command(flatten)]
        voucher: VoucherArgs,
    },

    #[command(name = "delete-voucher")]
    DeleteVoucher { id: String },

    // -------------------------------------------------------------------------
    // Member
    // -------------------------------------------------------------------------
    /// Show balances and redeemable vouchers.
    Dashboard,

    /// Show issued voucher instances.
    History,

    /// Redeem a catalog voucher.
    Redeem { voucher_id: String },

    /// Mark an issued voucher instance as used.
    Use { redemption_id: String },

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------
    /// Store a bearer token in the token file.
    Login { token: String },

    /// Remove the stored token.
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

#[derive(Debug, clap::Args)]
pub struct TierArgs {
    pub name: String,
    pub min_points: i64,
    pub max_points: i64,
    /// Benefits text (the remaining words)
    #[arg(required = true, num_args = 1..)]
    pub benefits: Vec<String>,
}

impl TierArgs {
    pub fn to_input(&self) -> TierInput {
        TierInput::new(
            self.name.clone(),
            self.benefits.join(" "),
            self.min_points,
            self.max_points,
        )
    }
}

#[derive(Debug, clap::Args)]
pub struct VoucherArgs {
    pub code: String,
    /// Amount off, or percent off with --percentage
    pub value: f64,
    /// Reward point cost (0 = one-time free voucher)
    #[arg(short, long, default_value_t = 0)]
    pub points: i64,
    #[arg(long)]
    pub percentage: bool,
    /// Reserve the voucher for members of this tier
    #[arg(short, long)]
    pub tier: Option<String>,
    /// Expiry date (YYYY-MM-DD)
    #[arg(short, long)]
    pub expires: Option<NaiveDate>,
}

impl VoucherArgs {
    pub fn to_input(&self) -> VoucherInput {
        let mut input = VoucherInput::new(self.code.clone(), self.value, self.points);
        if self.percentage {
            input = input.with_type(DiscountType::Percentage);
        }
        if let Some(tier) = &self.tier {
            input = input.with_tier(tier.clone());
        }
        if let Some(expires) = self.expires {
            input = input.with_expiry(expires);
        }
        input
    }
}
