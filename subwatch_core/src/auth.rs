//! OAuth2 credential storage and refresh for the YouTube Data API.
//!
//! The server's `/authorize` and `/oauth2callback` routes drive the consent
//! flow; this module owns everything after the redirect: exchanging the
//! authorization code, persisting tokens, and refreshing the access token
//! transparently when it nears expiry.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

/// Refresh this many seconds before the recorded expiry.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Builds the Google consent URL the browser is redirected to.
///
/// Requests offline access so a refresh token is issued on first consent.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        AUTH_ENDPOINT,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("include_granted_scopes", "true"),
        ],
    )
    .context("Failed to build authorization URL")?;
    Ok(url.into())
}

/// OAuth2 tokens persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    /// Issued on first consent; absent when Google omits it on re-consent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix seconds at which `access_token` expires. `None` means unknown,
    /// in which case the token is used as-is until the source rejects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl StoredToken {
    fn needs_refresh(&self, now_secs: u64) -> bool {
        match self.expires_at {
            Some(at) => now_secs + EXPIRY_MARGIN_SECS >= at,
            None => false,
        }
    }
}

/// Google's token endpoint response for both code exchange and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Loads, persists, and refreshes the OAuth2 credential used for fetches.
pub struct TokenStore {
    path: PathBuf,
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl TokenStore {
    pub fn new(
        path: impl Into<PathBuf>,
        client: reqwest::Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Whether a stored authorization exists at all.
    pub fn is_authenticated(&self) -> bool {
        self.path.exists()
    }

    /// Loads the persisted token.
    ///
    /// A missing or unreadable token file means the `/authorize` flow has
    /// not been completed (or its output was clobbered); either way the
    /// caller cannot fetch.
    pub fn load(&self) -> Result<StoredToken, MonitorError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|_| {
            MonitorError::AuthMissing(format!(
                "token file '{}' not found; complete the /authorize flow first",
                self.path.display()
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            MonitorError::AuthMissing(format!(
                "token file '{}' is unreadable ({}); re-run /authorize",
                self.path.display(),
                e
            ))
        })
    }

    /// Persists the token, temp-file-and-rename like the snapshot store.
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        let json = serde_json::to_string_pretty(token).context("Failed to serialize token")?;
        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write temp token file '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("Failed to move token file into place at '{}'", self.path.display())
        })?;
        Ok(())
    }

    /// Exchanges an authorization code for tokens and persists them.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<StoredToken> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", redirect_uri),
            ])
            .await
            .context("Authorization code exchange failed")?;

        let token = StoredToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_in.map(|secs| now_secs() + secs),
        };
        self.save(&token)?;
        tracing::info!("OAuth2 authorization complete, credentials saved");
        Ok(token)
    }

    /// Returns a valid access token, refreshing transparently when the
    /// stored one is at or within a minute of expiry.
    pub async fn access_token(&self) -> Result<String, MonitorError> {
        let token = self.load()?;
        if !token.needs_refresh(now_secs()) {
            return Ok(token.access_token);
        }

        match &token.refresh_token {
            Some(refresh_token) => {
                tracing::debug!("Access token expiring, refreshing");
                let refreshed = self
                    .refresh(refresh_token, &token)
                    .await
                    .map_err(MonitorError::SourceUnavailable)?;
                Ok(refreshed.access_token)
            }
            None => Err(MonitorError::AuthMissing(
                "access token expired and no refresh token is stored; re-run /authorize".into(),
            )),
        }
    }

    /// Refreshes the access token and persists the result.
    async fn refresh(&self, refresh_token: &str, previous: &StoredToken) -> Result<StoredToken> {
        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .await
            .context("Token refresh failed")?;

        let token = StoredToken {
            access_token: response.access_token,
            // Google omits the refresh token on refresh responses; keep the
            // one we already have unless a new one is issued.
            refresh_token: response
                .refresh_token
                .or_else(|| previous.refresh_token.clone()),
            expires_at: response.expires_in.map(|secs| now_secs() + secs),
        };
        self.save(&token)?;
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let resp = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(form)
            .send()
            .await
            .context("Failed to call OAuth2 token endpoint")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Token endpoint rejected request: HTTP {} — {}", status, body);
        }

        resp.json::<TokenResponse>()
            .await
            .context("Failed to parse token endpoint response")
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
