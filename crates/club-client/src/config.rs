//! # Client Configuration
//!
//! Where the club backend lives and where the bearer token comes from.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CLUB_API_URL=https://club.example.com/api                          │
//! │     CLUB_API_TIMEOUT_SECS=15                                           │
//! │     CLUB_TOKEN_FILE=/run/secrets/club-token                            │
//! │     CLUB_TOKEN_ENV=CLUB_TOKEN                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/admin/client.toml (Linux)                                │
//! │     ~/Library/Application Support/com.club.admin/client.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080/api, 30s timeout                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "https://club.example.com/api"
//! timeout_secs = 30
//!
//! [auth]
//! token_env = "CLUB_TOKEN"
//! token_file = "/home/me/.local/share/admin/token"
//! ```
//!
//! Retries are not configured here: a failed request is reported to the
//! screen, which offers its own retry action.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

const DEFAULT_CONFIG_FILE: &str = "client.toml";
const DEFAULT_TOKEN_FILE: &str = "token";

// =============================================================================
// API Settings
// =============================================================================

/// How to reach the club backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every route is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("club-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

// =============================================================================
// Auth Settings
// =============================================================================

/// Where the bearer token is looked up.
///
/// The environment variable wins over the token file when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Name of an environment variable holding the token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// File the token is stored in after `login`.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

fn default_token_env() -> String {
    "CLUB_TOKEN".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            token_env: default_token_env(),
            token_file: None,
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.auth.token_env.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "token_env must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from `lookup` (the process environment in [`load`](Self::load)).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CLUB_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("CLUB_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric CLUB_API_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = lookup("CLUB_TOKEN_FILE") {
            debug!(path = %path, "Overriding token file from environment");
            self.auth.token_file = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("CLUB_TOKEN_ENV") {
            self.auth.token_env = name;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "club", "admin")
            .map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Base URL with a trailing slash, so routes join underneath it.
    pub fn base_url(&self) -> ClientResult<Url> {
        let mut raw = self.api.base_url.trim_end_matches('/').to_string();
        raw.push('/');
        Ok(Url::parse(&raw)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Configured token file, or `token` in the platform data directory.
    pub fn token_file(&self) -> Option<PathBuf> {
        self.auth.token_file.clone().or_else(|| {
            directories::ProjectDirs::from("com", "club", "admin")
                .map(|dirs| dirs.data_dir().join(DEFAULT_TOKEN_FILE))
        })
    }
}
