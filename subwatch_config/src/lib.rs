//! # SubWatch Config
//!
//! Configuration system for the SubWatch subscription monitor.
//!
//! Provides TOML-based configuration parsing and validation for the HTTP
//! server, the polling monitor, the YouTube OAuth2 client, and the webhook
//! notification sink.
//!
//! # Configuration Schema
//!
//! The configuration file (`subwatch.toml`) supports the following sections:
//! - `[server]` — HTTP server settings (host, port, log_level)
//! - `[monitor]` — Poll interval, snapshot file path, outbound call timeout
//! - `[youtube]` — OAuth2 client credentials and token file path
//! - `[webhook]` — Notification sink URL and delivery timeout
//!
//! # Environment Variable Overrides
//!
//! Every config field can be overridden via environment variables using the
//! `SUBWATCH_` prefix and `_` as section separator:
//! - `SUBWATCH_SERVER_HOST` → `server.host`
//! - `SUBWATCH_SERVER_PORT` → `server.port`
//! - `SUBWATCH_SERVER_LOG_LEVEL` → `server.log_level`
//! - `SUBWATCH_MONITOR_POLL_INTERVAL_SECS` → `monitor.poll_interval_secs`
//! - `SUBWATCH_MONITOR_SNAPSHOT_PATH` → `monitor.snapshot_path`
//! - `SUBWATCH_MONITOR_REQUEST_TIMEOUT_SECS` → `monitor.request_timeout_secs`
//! - `SUBWATCH_YOUTUBE_CLIENT_ID` → `youtube.client_id`
//! - `SUBWATCH_YOUTUBE_CLIENT_SECRET` → `youtube.client_secret`
//! - `SUBWATCH_YOUTUBE_REDIRECT_URI` → `youtube.redirect_uri`
//! - `SUBWATCH_YOUTUBE_TOKEN_PATH` → `youtube.token_path`
//! - `SUBWATCH_WEBHOOK_URL` → `webhook.url`
//! - `SUBWATCH_WEBHOOK_TIMEOUT_SECS` → `webhook.timeout_secs`

use serde::{Deserialize, Serialize};

/// Top-level SubWatch configuration.
///
/// Parsed from `subwatch.toml` or constructed programmatically.
/// Environment variables with the `SUBWATCH_` prefix override TOML values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubwatchConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Polling monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// YouTube OAuth2 client settings.
    #[serde(default)]
    pub youtube: YouTubeConfig,
    /// Webhook notification sink settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP port (default: 8370).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log level (default: "info").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8370
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Polling monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between subscription polls (default: 300).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Path of the persisted subscription snapshot (default: "subscriptions.json").
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Timeout for outbound calls to the subscription source (default: 30s).
    /// A hung fetch must not stall the poll loop indefinitely.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            snapshot_path: default_snapshot_path(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_poll_interval() -> u64 {
    300
}
fn default_snapshot_path() -> String {
    "subscriptions.json".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

/// YouTube OAuth2 client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// OAuth2 client ID from the Google Cloud console.
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered for the OAuth2 client. Must match the
    /// `/oauth2callback` route of this server as seen from the browser.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Path of the persisted OAuth2 token file (default: "token.json").
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            token_path: default_token_path(),
        }
    }
}

fn default_redirect_uri() -> String {
    "http://localhost:8370/oauth2callback".to_string()
}
fn default_token_path() -> String {
    "token.json".to_string()
}

/// Webhook notification sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Sink URL for change notifications. When unset, deltas are logged
    /// and dropped instead of delivered.
    #[serde(default)]
    pub url: Option<String>,
    /// Timeout for the outbound notification call (default: 10s).
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_webhook_timeout(),
        }
    }
}

fn default_webhook_timeout() -> u64 {
    10
}

impl SubwatchConfig {
    /// Load configuration from a TOML file, then apply environment variable overrides.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse_toml(&contents)
    }

    /// Parse configuration from a TOML string, apply env overrides, then validate.
    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        let mut config: SubwatchConfig = toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Variables use the `SUBWATCH_` prefix with `_` as section separator
    /// (see the crate-level docs for the full list).
    pub fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(v) = std::env::var("SUBWATCH_SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = std::env::var("SUBWATCH_SERVER_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(v) = std::env::var("SUBWATCH_SERVER_LOG_LEVEL") {
            self.server.log_level = v;
        }

        // Monitor overrides
        if let Ok(v) = std::env::var("SUBWATCH_MONITOR_POLL_INTERVAL_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.monitor.poll_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("SUBWATCH_MONITOR_SNAPSHOT_PATH") {
            self.monitor.snapshot_path = v;
        }
        if let Ok(v) = std::env::var("SUBWATCH_MONITOR_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.monitor.request_timeout_secs = secs;
            }
        }

        // YouTube overrides
        if let Ok(v) = std::env::var("SUBWATCH_YOUTUBE_CLIENT_ID") {
            self.youtube.client_id = v;
        }
        if let Ok(v) = std::env::var("SUBWATCH_YOUTUBE_CLIENT_SECRET") {
            self.youtube.client_secret = v;
        }
        if let Ok(v) = std::env::var("SUBWATCH_YOUTUBE_REDIRECT_URI") {
            self.youtube.redirect_uri = v;
        }
        if let Ok(v) = std::env::var("SUBWATCH_YOUTUBE_TOKEN_PATH") {
            self.youtube.token_path = v;
        }

        // Webhook overrides
        if let Ok(v) = std::env::var("SUBWATCH_WEBHOOK_URL") {
            self.webhook.url = Some(v);
        }
        if let Ok(v) = std::env::var("SUBWATCH_WEBHOOK_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.webhook.timeout_secs = secs;
            }
        }
    }

    /// Validate the configuration, returning a descriptive error on the
    /// first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }
        if self.monitor.poll_interval_secs == 0 {
            anyhow::bail!("monitor.poll_interval_secs must be at least 1");
        }
        if self.monitor.request_timeout_secs == 0 {
            anyhow::bail!("monitor.request_timeout_secs must be at least 1");
        }
        if self.monitor.snapshot_path.is_empty() {
            anyhow::bail!("monitor.snapshot_path must not be empty");
        }
        if self.youtube.token_path.is_empty() {
            anyhow::bail!("youtube.token_path must not be empty");
        }
        if let Some(url) = &self.webhook.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("webhook.url must be an http(s) URL, got '{}'", url);
            }
        }
        if self.webhook.timeout_secs == 0 {
            anyhow::bail!("webhook.timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Generate an example configuration as a TOML string (plain, no comments).
    pub fn example_toml() -> String {
        let config = SubwatchConfig::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| "# Failed to generate example".to_string())
    }

    /// Generate a fully commented example configuration file.
    ///
    /// This is suitable for `subwatch_server --init-config` output.
    pub fn example_toml_commented() -> String {
        r#"# =============================================================================
# SubWatch Configuration File
# =============================================================================
# This file configures the SubWatch subscription monitor.
# All values shown below are defaults — uncomment and modify as needed.
#
# Environment variables override TOML values. Use the SUBWATCH_ prefix:
#   SUBWATCH_SERVER_PORT=9000 subwatch_server

# -----------------------------------------------------------------------------
# [server] — HTTP server settings
# -----------------------------------------------------------------------------
[server]
# Bind address for the REST API.
host = "0.0.0.0"
# HTTP port for the REST API.
port = 8370
# Log level: trace, debug, info, warn, error
log_level = "info"

# -----------------------------------------------------------------------------
# [monitor] — Subscription polling
# -----------------------------------------------------------------------------
[monitor]
# Seconds between polls of the subscription list.
poll_interval_secs = 300
# File holding the last-known subscription set. Ordered by title so the
# file stays human-diffable.
snapshot_path = "subscriptions.json"
# Timeout for each outbound call to the YouTube API.
request_timeout_secs = 30

# -----------------------------------------------------------------------------
# [youtube] — OAuth2 client for the YouTube Data API v3
# -----------------------------------------------------------------------------
[youtube]
# OAuth2 client credentials from the Google Cloud console.
client_id = ""
client_secret = ""
# Redirect URI registered for the client; must point at this server's
# /oauth2callback route.
redirect_uri = "http://localhost:8370/oauth2callback"
# File holding the persisted OAuth2 tokens.
token_path = "token.json"

# -----------------------------------------------------------------------------
# [webhook] — Change notification sink
# -----------------------------------------------------------------------------
[webhook]
# Sink URL receiving a JSON {"content": "..."} POST per detected change.
# When unset, changes are logged but not delivered.
# url = "https://discord.com/api/webhooks/..."
# Timeout for the notification POST.
timeout_secs = 10
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SubwatchConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8370);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.monitor.poll_interval_secs, 300);
        assert_eq!(config.monitor.snapshot_path, "subscriptions.json");
        assert_eq!(config.monitor.request_timeout_secs, 30);
        assert_eq!(config.youtube.token_path, "token.json");
        assert!(config.webhook.url.is_none());
        assert_eq!(config.webhook.timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_partial() {
        let toml_str = r#"
            [server]
            port = 9000

            [monitor]
            poll_interval_secs = 60

            [webhook]
            url = "https://example.com/hook"
        "#;
        let config = SubwatchConfig::parse_toml(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.monitor.poll_interval_secs, 60);
        assert_eq!(config.monitor.snapshot_path, "subscriptions.json");
        assert_eq!(config.webhook.url.as_deref(), Some("https://example.com/hook"));
    }

    #[test]
    fn test_parse_toml_invalid() {
        assert!(SubwatchConfig::parse_toml("not [valid toml").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = SubwatchConfig::default();
        config.monitor.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = SubwatchConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_webhook() {
        let mut config = SubwatchConfig::default();
        config.webhook.url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override_applied() {
        std::env::set_var("SUBWATCH_MONITOR_SNAPSHOT_PATH", "/tmp/subs-override.json");
        let mut config = SubwatchConfig::default();
        config.apply_env_overrides();
        std::env::remove_var("SUBWATCH_MONITOR_SNAPSHOT_PATH");
        assert_eq!(config.monitor.snapshot_path, "/tmp/subs-override.json");
    }

    #[test]
    fn test_env_override_ignores_unparseable_number() {
        std::env::set_var("SUBWATCH_WEBHOOK_TIMEOUT_SECS", "not-a-number");
        let mut config = SubwatchConfig::default();
        config.apply_env_overrides();
        std::env::remove_var("SUBWATCH_WEBHOOK_TIMEOUT_SECS");
        assert_eq!(config.webhook.timeout_secs, 10);
    }

    #[test]
    fn test_example_toml_round_trips() {
        let example = SubwatchConfig::example_toml();
        let parsed: SubwatchConfig = toml::from_str(&example).unwrap();
        assert_eq!(parsed.server.port, 8370);
    }

    #[test]
    fn test_example_toml_commented_parses() {
        let example = SubwatchConfig::example_toml_commented();
        let parsed: SubwatchConfig = toml::from_str(&example).unwrap();
        assert_eq!(parsed.monitor.poll_interval_secs, 300);
        assert_eq!(parsed.youtube.token_path, "token.json");
    }
}
