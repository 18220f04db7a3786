//! # club-client: Backend Access and Screen Controllers
//!
//! Connects the pure rules in `club-core` to the club REST backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          club-client                                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                          screens                                 │  │
//! │  │   TierScreen       VoucherAdminScreen       RedeemScreen         │  │
//! │  └───────────────────────────┬──────────────────────────────────────┘  │
//! │                              │ Arc<dyn ClubApi>                        │
//! │  ┌───────────────────────────▼──────────────────────────────────────┐  │
//! │  │  HttpClubApi (reqwest)  ◄── Arc<dyn CredentialProvider>          │  │
//! │  │        ▲                                                         │  │
//! │  │        └── ClientConfig (client.toml + CLUB_* env)               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = ClientConfig::load(None)?;
//! let credentials = Arc::new(ConfiguredToken::from_config(&config));
//! let api: Arc<dyn ClubApi> = Arc::new(HttpClubApi::new(&config, credentials)?);
//!
//! let screen = RedeemScreen::new(api);
//! screen.load().await?;
//! for row in screen.rows() { /* render */ }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod screens;

#[cfg(test)]
mod testing;

pub use api::{ClubApi, HttpClubApi};
pub use auth::{ConfiguredToken, CredentialProvider, EnvToken, StaticToken, TokenFile};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use screens::{Banner, BannerKind, FormOutcome, RedeemScreen, TierScreen, VoucherAdminScreen};
