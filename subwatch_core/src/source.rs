//! The authoritative subscription source — the YouTube Data API v3.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::auth::TokenStore;
use crate::error::MonitorError;
use crate::subscription::Subscription;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Produces the complete current set of subscribed channels.
///
/// Implementations paginate transparently; one call yields the whole list.
#[allow(async_fn_in_trait)]
pub trait SubscriptionSource: Send + Sync {
    /// Fetches every subscription for the authenticated user.
    async fn fetch_all(&self) -> Result<Vec<Subscription>, MonitorError>;
}

/// YouTube Data API v3 implementation of [`SubscriptionSource`].
///
/// Pages through `subscriptions.list` (50 items per page, the API maximum)
/// following `nextPageToken` until the last page.
pub struct YouTubeSource {
    client: reqwest::Client,
    tokens: Arc<TokenStore>,
}

impl YouTubeSource {
    pub fn new(client: reqwest::Client, tokens: Arc<TokenStore>) -> Self {
        Self { client, tokens }
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<SubscriptionListResponse> {
        let mut params = vec![
            ("part", "snippet"),
            ("mine", "true"),
            ("maxResults", "50"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let resp: SubscriptionListResponse = self
            .client
            .get(format!("{}/subscriptions", YOUTUBE_API_BASE))
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .context("Failed to call YouTube subscriptions.list API")?
            .json()
            .await
            .context("Failed to parse YouTube subscriptions.list response")?;

        if let Some(error) = resp.error {
            bail!("YouTube API error: {} ({})", error.message, error.code);
        }

        Ok(resp)
    }
}

impl SubscriptionSource for YouTubeSource {
    async fn fetch_all(&self) -> Result<Vec<Subscription>, MonitorError> {
        let access_token = self.tokens.access_token().await?;

        let mut subs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let resp = self
                .fetch_page(&access_token, page_token.as_deref())
                .await
                .map_err(MonitorError::SourceUnavailable)?;

            for item in resp.items.unwrap_or_default() {
                subs.push(Subscription {
                    channel_id: item.snippet.resource_id.channel_id,
                    title: item.snippet.title,
                });
            }

            match resp.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!("Fetched {} subscriptions", subs.len());
        Ok(subs)
    }
}

// Wire types for the subscriptions.list response.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionListResponse {
    items: Option<Vec<SubscriptionItem>>,
    next_page_token: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionSnippet {
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subscription_page() {
        let json = r#"{
            "kind": "youtube#subscriptionListResponse",
            "nextPageToken": "CAUQAA",
            "pageInfo": { "totalResults": 123, "resultsPerPage": 50 },
            "items": [
                {
                    "snippet": {
                        "title": "Some Channel",
                        "resourceId": { "kind": "youtube#channel", "channelId": "UCabc" }
                    }
                },
                {
                    "snippet": {
                        "title": "Another",
                        "resourceId": { "channelId": "UCdef" }
                    }
                }
            ]
        }"#;

        let resp: SubscriptionListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.next_page_token.as_deref(), Some("CAUQAA"));
        let items = resp.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].snippet.resource_id.channel_id, "UCabc");
        assert_eq!(items[1].snippet.title, "Another");
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_parse_last_page_without_token() {
        let json = r#"{ "items": [] }"#;
        let resp: SubscriptionListResponse = serde_json::from_str(json).unwrap();
        assert!(resp.next_page_token.is_none());
        assert!(resp.items.unwrap().is_empty());
    }

    #[test]
    fn test_parse_api_error_body() {
        let json = r#"{
            "error": { "code": 401, "message": "Invalid Credentials", "errors": [] }
        }"#;
        let resp: SubscriptionListResponse = serde_json::from_str(json).unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, 401);
        assert_eq!(error.message, "Invalid Credentials");
    }
}
