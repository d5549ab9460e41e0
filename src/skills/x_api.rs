//! X Posting Skill
//!
//! Posts tweets through an X API relay. Configured by the
//! `twitter_posting` entry in the character's skills section.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::error::BeingError;
use crate::types::{PostOutcome, PostingClient, SkillConfig};

const DEFAULT_API_URL: &str = "https://api.x.com/2";

/// Tweet-posting client backed by the X API.
pub struct XApiClient {
    enabled: bool,
    api_url: String,
    api_key: String,
    http: Client,
}

impl XApiClient {
    /// Build the client from the `twitter_posting` skill config. The
    /// bearer token comes from the environment, not the config file.
    pub fn from_config(config: &SkillConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build X API HTTP client")?;

        Ok(Self {
            enabled: config.enabled,
            api_url: config
                .setting_str("api_url")
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl PostingClient for XApiClient {
    async fn post_tweet(&self, text: &str, media_urls: &[String]) -> Result<PostOutcome> {
        if !self.enabled {
            return Err(BeingError::ExternalService(
                "twitter posting skill is disabled".to_string(),
            )
            .into());
        }

        let mut body = serde_json::json!({ "text": text });
        if !media_urls.is_empty() {
            body["media_urls"] = serde_json::json!(media_urls);
        }

        let url = format!("{}/tweets", self.api_url);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Tweet post request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("X API error: {}: {}", status.as_u16(), text);
        }

        let data: Value = resp.json().await.context("Failed to parse X API response")?;
        let tweet_id = data["data"]["id"].as_str().map(|s| s.to_string());
        let tweet_link = tweet_id
            .as_ref()
            .map(|id| format!("https://x.com/i/status/{}", id));

        info!(tweet_id = ?tweet_id, "Tweet posted");
        Ok(PostOutcome {
            tweet_id,
            tweet_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_disabled_skill_fails_without_network() {
        let config = SkillConfig {
            enabled: false,
            settings: BTreeMap::new(),
        };
        let client = XApiClient::from_config(&config, "key".to_string()).unwrap();
        let err = client.post_tweet("hello", &[]).await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_api_url_override_from_settings() {
        let mut settings = BTreeMap::new();
        settings.insert(
            "api_url".to_string(),
            serde_json::json!("https://relay.example/x/"),
        );
        let config = SkillConfig {
            enabled: true,
            settings,
        };
        let client = XApiClient::from_config(&config, "key".to_string()).unwrap();
        assert_eq!(client.api_url, "https://relay.example/x");
    }
}
