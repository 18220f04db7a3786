//! # Club REST API
//!
//! The [`ClubApi`] trait lists every backend operation the screens use;
//! [`HttpClubApi`] implements it over HTTP/JSON with `reqwest`.
//!
//! ## Routes
//! ```text
//! ┌──────────────────────────────┬────────────────────────────────────────┐
//! │ Operation                    │ Route                                  │
//! ├──────────────────────────────┼────────────────────────────────────────┤
//! │ list_tiers / create_tier     │ GET / POST   tiers                     │
//! │ update_tier / delete_tier    │ PUT / DELETE tiers/{id}                │
//! │ set_tier_status              │ PATCH        tiers/{id}/status         │
//! │ list_vouchers / create_...   │ GET / POST   vouchers                  │
//! │ create_tier_voucher          │ POST         tiers/{tierName}/vouchers │
//! │ update_voucher / delete_...  │ PUT / DELETE vouchers/{id}             │
//! │ get_dashboard                │ GET          members/me/dashboard      │
//! │ list_my_redemptions          │ GET          redemptions/me            │
//! │ redeem_voucher               │ POST         vouchers/{id}/redeem      │
//! │ use_voucher                  │ POST         redemptions/{id}/use      │
//! └──────────────────────────────┴────────────────────────────────────────┘
//! ```
//!
//! List responses are decoded leniently into [`Listing`]: a body that is not
//! an array becomes an empty list with an issue attached, never an error.
//!
//! Mutations return `()`. The backend is the source of truth, so callers
//! refetch instead of trusting an echoed entity.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use club_core::{
    Dashboard, Listing, RedeemReceipt, Redemption, Tier, TierInput, TierStatusUpdate, Voucher,
    VoucherInput,
};

use crate::auth::CredentialProvider;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =============================================================================
// Trait
// =============================================================================

/// Backend operations used by the club screens.
#[async_trait]
pub trait ClubApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Tiers
    // -------------------------------------------------------------------------
    async fn list_tiers(&self) -> ClientResult<Listing<Tier>>;
    async fn create_tier(&self, data: &TierInput) -> ClientResult<()>;
    async fn update_tier(&self, id: &str, data: &TierInput) -> ClientResult<()>;
    async fn delete_tier(&self, id: &str) -> ClientResult<()>;
    async fn set_tier_status(&self, id: &str, active: bool) -> ClientResult<()>;

    // -------------------------------------------------------------------------
    // Voucher catalog
    // -------------------------------------------------------------------------
    async fn list_vouchers(&self) -> ClientResult<Listing<Voucher>>;
    async fn create_voucher(&self, data: &VoucherInput) -> ClientResult<()>;
    /// Creates a voucher reserved for members of `tier_name`.
    async fn create_tier_voucher(&self, tier_name: &str, data: &VoucherInput) -> ClientResult<()>;
    async fn update_voucher(&self, id: &str, data: &VoucherInput) -> ClientResult<()>;
    async fn delete_voucher(&self, id: &str) -> ClientResult<()>;

    // -------------------------------------------------------------------------
    // Member
    // -------------------------------------------------------------------------
    async fn get_dashboard(&self) -> ClientResult<Dashboard>;
    async fn list_my_redemptions(&self) -> ClientResult<Listing<Redemption>>;
    /// Spends points (if any) and issues a new voucher instance.
    async fn redeem_voucher(&self, voucher_id: &str) -> ClientResult<RedeemReceipt>;
    /// Marks an issued instance as used.
    async fn use_voucher(&self, redemption_id: &str) -> ClientResult<RedeemReceipt>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// [`ClubApi`] over HTTP/JSON.
pub struct HttpClubApi {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpClubApi {
    /// Builds a client with the configured base URL, timeout and user agent.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> ClientResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpClubApi {
            http,
            base_url: config.base_url()?,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request and returns the raw body of a 2xx response.
    ///
    /// Non-2xx responses become [`ClientError::Http`] carrying the server's
    /// message. Every failure is logged with the request id.
    async fn send_text(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> ClientResult<String> {
        let url = self.url(segments)?;
        let request_id = Uuid::new_v4();
        let token = self.credentials.bearer_token().await?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(token)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!(%request_id, %method, path = url.path(), "Sending request");

        let response = request.send().await.map_err(|e| {
            let err = ClientError::from(e);
            warn!(%request_id, %method, path = url.path(), error = %err, "Request failed");
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let err = ClientError::from(e);
            warn!(%request_id, status = status.as_u16(), error = %err, "Failed to read response body");
            err
        })?;

        if !status.is_success() {
            let message = server_message(&text);
            warn!(
                %request_id,
                %method,
                path = url.path(),
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "Server rejected request"
            );
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(%request_id, status = status.as_u16(), "Request completed");
        Ok(text)
    }

    /// Like [`Self::send_text`], parsed as JSON (`Null` when empty).
    async fn send(&self, method: Method, segments: &[&str], body: Option<Value>) -> ClientResult<Value> {
        let text = self.send_text(method, segments, body).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            warn!(path = %segments.join("/"), error = %e, "Response is not JSON");
            ClientError::from(e)
        })
    }

    /// Lists never fail on a bad 2xx body: it decodes to an empty, flagged listing.
    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<Listing<T>> {
        let text = self.send_text(Method::GET, segments, None).await?;
        let listing = Listing::from_body(&text);
        if let Some(issue) = listing.issue() {
            warn!(path = %segments.join("/"), %issue, "Unexpected list response");
        }
        Ok(listing)
    }

    async fn get_one<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        decode(self.send(Method::GET, segments, None).await?)
    }

    async fn write(&self, method: Method, segments: &[&str], body: Option<Value>) -> ClientResult<()> {
        self.send(method, segments, body).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    Ok(serde_json::from_value(value)?)
}

fn to_body<T: serde::Serialize>(data: &T) -> ClientResult<Option<Value>> {
    Ok(Some(serde_json::to_value(data)?))
}

/// Pulls a user-facing message out of an error body.
///
/// Looks at `message`, then `error`. Returns `None` when neither is a
/// non-empty string, in which case the generic fallback is shown.
pub fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl ClubApi for HttpClubApi {
    async fn list_tiers(&self) -> ClientResult<Listing<Tier>> {
        self.get_list(&["tiers"]).await
    }

    async fn create_tier(&self, data: &TierInput) -> ClientResult<()> {
        self.write(Method::POST, &["tiers"], to_body(data)?).await
    }

    async fn update_tier(&self, id: &str, data: &TierInput) -> ClientResult<()> {
        self.write(Method::PUT, &["tiers", id], to_body(data)?).await
    }

    async fn delete_tier(&self, id: &str) -> ClientResult<()> {
        self.write(Method::DELETE, &["tiers", id], None).await
    }

    async fn set_tier_status(&self, id: &str, active: bool) -> ClientResult<()> {
        let body = to_body(&TierStatusUpdate { active })?;
        self.write(Method::PATCH, &["tiers", id, "status"], body).await
    }

    async fn list_vouchers(&self) -> ClientResult<Listing<Voucher>> {
        self.get_list(&["vouchers"]).await
    }

    async fn create_voucher(&self, data: &VoucherInput) -> ClientResult<()> {
        self.write(Method::POST, &["vouchers"], to_body(data)?).await
    }

    async fn create_tier_voucher(&self, tier_name: &str, data: &VoucherInput) -> ClientResult<()> {
        self.write(Method::POST, &["tiers", tier_name, "vouchers"], to_body(data)?)
            .await
    }

    async fn update_voucher(&self, id: &str, data: &VoucherInput) -> ClientResult<()> {
        self.write(Method::PUT, &["vouchers", id], to_body(data)?).await
    }

    async fn delete_voucher(&self, id: &str) -> ClientResult<()> {
        self.write(Method::DELETE, &["vouchers", id], None).await
    }

    async fn get_dashboard(&self) -> ClientResult<Dashboard> {
        self.get_one(&["members", "me", "dashboard"]).await
    }

    async fn list_my_redemptions(&self) -> ClientResult<Listing<Redemption>> {
        self.get_list(&["redemptions", "me"]).await
    }

    async fn redeem_voucher(&self, voucher_id: &str) -> ClientResult<RedeemReceipt> {
        decode(
            self.send(Method::POST, &["vouchers", voucher_id, "redeem"], None)
                .await?,
        )
    }

    async fn use_voucher(&self, redemption_id: &str) -> ClientResult<RedeemReceipt> {
        decode(
            self.send(Method::POST, &["redemptions", redemption_id, "use"], None)
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    fn client(base: &str) -> HttpClubApi {
        let mut config = ClientConfig::default();
        config.api.base_url = base.to_string();
        HttpClubApi::new(&config, Arc::new(StaticToken::new("t"))).unwrap()
    }

    #[test]
    fn test_routes_join_under_base_path() {
        let api = client("https://club.example.com/api/");
        assert_eq!(
            api.url(&["tiers", "t1", "status"]).unwrap().as_str(),
            "https://club.example.com/api/tiers/t1/status"
        );
        assert_eq!(
            api.url(&["members", "me", "dashboard"]).unwrap().as_str(),
            "https://club.example.com/api/members/me/dashboard"
        );
    }

    #[test]
    fn test_tier_name_is_percent_encoded() {
        let api = client("http://localhost:8080/api");
        assert_eq!(
            api.url(&["tiers", "Gold Plus/VIP", "vouchers"])
                .unwrap()
                .as_str(),
            "http://localhost:8080/api/tiers/Gold%20Plus%2FVIP/vouchers"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;
        let result = HttpClubApi::new(&config, Arc::new(StaticToken::new("t")));
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message": "Insufficient points"}"#).as_deref(),
            Some("Insufficient points")
        );
        assert_eq!(
            server_message(r#"{"error": "Tier not found"}"#).as_deref(),
            Some("Tier not found")
        );
        assert_eq!(
            server_message(r#"{"message": "", "error": "Conflict"}"#).as_deref(),
            Some("Conflict")
        );
        assert_eq!(server_message(r#"{"status": 500}"#), None);
        assert_eq!(server_message("<html>Bad Gateway</html>"), None);
        assert_eq!(server_message(""), None);
    }

    #[test]
    fn test_decode_receipt() {
        let receipt: RedeemReceipt =
            decode(serde_json::json!({"voucherCode": "FREE1-abc123"})).unwrap();
        assert_eq!(receipt.voucher_code, "FREE1-abc123");

        let err = decode::<RedeemReceipt>(Value::Null).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
