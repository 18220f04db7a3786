//! # Credential Providers
//!
//! Every backend call carries a bearer token. Where that token comes from is
//! injected into [`HttpClubApi`](crate::api::HttpClubApi) as a
//! [`CredentialProvider`], so nothing in this crate reads global state.
//!
//! ```text
//! ┌──────────────┐   bearer_token()   ┌──────────────────────────────────┐
//! │ HttpClubApi  │───────────────────►│ dyn CredentialProvider           │
//! └──────────────┘                    │                                  │
//!                                     │  StaticToken     (tests, CI)     │
//!                                     │  EnvToken        ($CLUB_TOKEN)   │
//!                                     │  TokenFile       (login/logout)  │
//!                                     │  ConfiguredToken (env, then file)│
//!                                     └──────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Owner read/write only.
#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

/// Supplies the bearer token for API calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the current token.
    ///
    /// Fails with [`ClientError::MissingCredentials`] when there is none.
    async fn bearer_token(&self) -> ClientResult<String>;

    /// Returns the provider name for logging.
    fn name(&self) -> &'static str;
}

fn non_empty(token: &str, source: &str) -> ClientResult<String> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ClientError::MissingCredentials(format!(
            "no token in {}",
            source
        )));
    }
    Ok(token.to_string())
}

// =============================================================================
// Static Token
// =============================================================================

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> ClientResult<String> {
        non_empty(&self.0, "static token")
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// =============================================================================
// Environment Variable
// =============================================================================

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        EnvToken { var: var.into() }
    }

    fn read(&self) -> ClientResult<String> {
        let value = std::env::var(&self.var).unwrap_or_default();
        non_empty(&value, &format!("${}", self.var))
    }
}

#[async_trait]
impl CredentialProvider for EnvToken {
    async fn bearer_token(&self) -> ClientResult<String> {
        self.read()
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

// =============================================================================
// Token File
// =============================================================================

/// A token persisted in a file by `login` and removed by `logout`.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `token`, creating parent directories.
    ///
    /// On unix the file is restricted to the owner (0600) before the token
    /// is written, including when it already existed with wider permissions.
    pub async fn store(&self, token: &str) -> ClientResult<()> {
        let token = non_empty(token, "login input")?;
        let store_err = |e: std::io::Error| ClientError::TokenStore(e.to_string());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(store_err)?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(TOKEN_FILE_MODE);
        let file = options.open(&self.path).await.map_err(store_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(TOKEN_FILE_MODE))
                .await
                .map_err(store_err)?;
        }
        drop(file);

        tokio::fs::write(&self.path, token).await.map_err(store_err)?;

        info!(path = ?self.path, "Token stored");
        Ok(())
    }

    /// Removes the file. Returns false if there was nothing to remove.
    pub async fn clear(&self) -> ClientResult<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = ?self.path, "Token cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }
}

#[async_trait]
impl CredentialProvider for TokenFile {
    async fn bearer_token(&self) -> ClientResult<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => non_empty(&contents, "token file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                ClientError::MissingCredentials("not signed in".to_string()),
            ),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

// =============================================================================
// Configured Chain
// =============================================================================

/// The environment variable when set, otherwise the token file.
#[derive(Debug, Clone)]
pub struct ConfiguredToken {
    env: EnvToken,
    file: Option<TokenFile>,
}

impl ConfiguredToken {
    pub fn from_config(config: &ClientConfig) -> Self {
        ConfiguredToken {
            env: EnvToken::new(config.auth.token_env.clone()),
            file: config.token_file().map(TokenFile::new),
        }
    }

    pub fn token_file(&self) -> Option<&TokenFile> {
        self.file.as_ref()
    }
}

#[async_trait]
impl CredentialProvider for ConfiguredToken {
    async fn bearer_token(&self) -> ClientResult<String> {
        match self.env.read() {
            Ok(token) => Ok(token),
            Err(env_err) => match &self.file {
                Some(file) => {
                    debug!(var = %self.env.var, "Token variable unset, using token file");
                    file.bearer_token().await
                }
                None => Err(env_err),
            },
        }
    }

    fn name(&self) -> &'static str {
        "configured"
    }
}
