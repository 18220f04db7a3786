//! # club-core: Pure Business Rules for the Club Manager
//!
//! Everything the admin screens and the member redemption panel decide on
//! their own, before or after talking to the backend, lives here as pure
//! functions over in-memory collections.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Club Manager Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 club-admin / browser front end                  │   │
//! │  │    Tier table ──► Voucher table ──► Redemption cards            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             club-client (screens + REST client)                 │   │
//! │  │    fetch ──► validate / reconcile ──► call API ──► refetch      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ club-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │   tier    │  │ redemption │  │ validation│ │   │
//! │  │   │ Tier      │  │ overlap   │  │ reconcile  │  │  fields   │ │   │
//! │  │   │ Voucher   │  │ checks    │  │ eligibility│  │           │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TOKEN STORAGE • PURE FUNCTIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire and view-model types (Tier, Voucher, Redemption, ...)
//! - [`points`] - Integer reward/tier point amounts
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules for the tier and voucher forms
//! - [`tier`] - Tier range validator (overlap detection)
//! - [`redemption`] - Voucher redemption reconciler and eligibility gate
//! - [`collection`] - Lenient decoding of list responses
//!
//! ## Example Usage
//!
//! ```rust
//! use club_core::tier::validate_tier;
//! use club_core::types::{Tier, TierInput};
//!
//! let existing = vec![Tier::new("t1", "Silver", 100, 200)];
//! let candidate = TierInput::new("Gold", "Lounge access", 50, 150);
//!
//! let result = validate_tier(&candidate, None, &existing);
//! assert!(!result.is_valid());
//! assert_eq!(result.conflict().unwrap().tier_name, "Silver");
//! ```

pub mod collection;
pub mod error;
pub mod points;
pub mod redemption;
pub mod tier;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collection::Listing;
pub use error::{CoreError, CoreResult, DataShapeError, ValidationError};
pub use points::Points;
pub use redemption::{reconcile, InFlight, VoucherPhase, VoucherRow};
pub use tier::{validate_tier, TierConflict, TierField, TierValidation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a tier name, in characters.
pub const MAX_TIER_NAME_LEN: usize = 30;

/// Maximum length of a voucher code, in characters.
pub const MAX_VOUCHER_CODE_LEN: usize = 20;

/// Separator between the catalog code and the instance suffix in an issued
/// voucher code (`"FREE1-abc123"`).
pub const VOUCHER_CODE_SEPARATOR: char = '-';
