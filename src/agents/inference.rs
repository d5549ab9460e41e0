//! Inference Client
//!
//! Wraps an OpenAI-compatible /v1/chat/completions endpoint. All three
//! agents share one client; every call is a single system+user exchange
//! that returns plain text.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Single-exchange chat completion seam. Agents depend on this trait
/// so tests can substitute canned responses.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Inference client for OpenAI-compatible chat completions.
pub struct OpenAiClient {
    api_url: String,
    api_key: String,
    model: String,
    http: Client,
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// * `api_url` - Base URL for the inference API (e.g. `https://api.openai.com`).
    /// * `api_key` - Bearer token.
    /// * `model` - Model identifier (e.g. `gpt-4o-mini`).
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build inference HTTP client")?;

        Ok(Self {
            api_url,
            api_key,
            model,
            http,
        })
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "stream": false,
        });

        let url = format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Inference error: {}: {}", status.as_u16(), text);
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse inference response")?;

        let content = data["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| anyhow::anyhow!("No completion choice returned from inference"))?;

        Ok(content.to_string())
    }
}
