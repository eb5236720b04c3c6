use super::http::decode_response;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::Mutex;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The four secrets used to build the authenticated handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub refresh_token: Option<String>,
}

impl OAuthCredentials {
    /// Environment variable names of the credentials that are unset or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("CLIENT_ID", &self.client_id),
            ("CLIENT_SECRET", &self.client_secret),
            ("REDIRECT_URI", &self.redirect_uri),
            ("REFRESH_TOKEN", &self.refresh_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Exchanges the refresh token for bearer tokens and keeps the current one
/// until it is about to expire. Reads of a live token never wait on a refresh.
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    credentials: OAuthCredentials,
    cached: RwLock<Option<AccessToken>>,
    refresh: Mutex<()>,
}

impl TokenProvider {
    pub fn new(
        client: reqwest::Client,
        token_url: impl Into<String>,
        credentials: OAuthCredentials,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            credentials,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.live_token() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        if let Some(token) = self.live_token() {
            return Ok(token);
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        *self.cached.write() = Some(token);
        Ok(value)
    }

    fn live_token(&self) -> Option<String> {
        let margin = Duration::seconds(EXPIRY_MARGIN_SECS);
        self.cached
            .read()
            .as_ref()
            .filter(|token| token.expires_at - margin > Utc::now())
            .map(|token| token.value.clone())
    }

    async fn fetch(&self) -> Result<AccessToken> {
        tracing::debug!(token_url = %self.token_url, "refreshing access token");
        let creds = &self.credentials;
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", creds.client_id.as_deref().unwrap_or_default()),
            (
                "client_secret",
                creds.client_secret.as_deref().unwrap_or_default(),
            ),
            (
                "refresh_token",
                creds.refresh_token.as_deref().unwrap_or_default(),
            ),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .context("failed to reach the token endpoint")?;
        let body: TokenResponse = decode_response(response).await?;

        let lifetime = body.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        Ok(AccessToken {
            value: body.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }
}
