//! # Client Error Types
//!
//! Error types for backend access and screen operations.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Credentials   │  │     Transport           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  MissingCreds   │  │  Network / Timeout      │ │
//! │  │  InvalidUrl     │  │  TokenStore     │  │  Http { status, msg }   │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Decode                 │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Core (validation, conflicts, in-flight, data shape)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every category is recoverable at the screen level: the screen shows
//! [`ClientError::user_message`] in its banner and the user can retry.

use club_core::CoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown when the server gave no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// No bearer token is available. The user needs to sign in.
    #[error("Not signed in: {0}")]
    MissingCredentials(String),

    #[error("Token storage error: {0}")]
    TokenStore(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got a response.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    ///
    /// `message` is the server's own message when it sent one.
    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Http { status: u16, message: Option<String> },

    /// The response body could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                message: None,
            }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<club_core::ValidationError> for ClientError {
    fn from(err: club_core::ValidationError) -> Self {
        ClientError::Core(err.into())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout => true,
            ClientError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the user has to sign in (again).
    pub fn needs_sign_in(&self) -> bool {
        matches!(
            self,
            ClientError::MissingCredentials(_) | ClientError::Http { status: 401, .. }
        )
    }

    /// Text for the screen banner.
    ///
    /// Server messages are passed through verbatim; otherwise a generic
    /// fallback is used for transport failures.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Http { message: None, .. }
            | ClientError::Network(_)
            | ClientError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
            ClientError::Timeout => "The server took too long to respond.".to_string(),
            other => other.to_string(),
        }
    }
}
