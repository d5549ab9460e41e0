//! Image Generation Skill
//!
//! Generates images through an OpenAI-compatible images endpoint. The
//! prompt is enriched with the being's personality and color scheme so
//! generated art stays on-character. A daily cap bounds spending.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::agents::thought::describe_personality;
use crate::error::BeingError;
use crate::types::{CharacterConfig, ImageClient, ImageOutcome, SkillConfig};

const DEFAULT_API_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "dall-e-3";
const DEFAULT_MAX_PER_DAY: u64 = 10;

/// Sizes the backend accepts; anything else is coerced to the largest.
const SUPPORTED_SIZES: &[(u32, u32)] = &[(256, 256), (512, 512), (1024, 1024)];

/// Image generation client with a per-day cap.
pub struct ImageGenClient {
    enabled: bool,
    api_url: String,
    api_key: String,
    model: String,
    max_per_day: u64,
    usage: Mutex<DailyUsage>,
    character: CharacterConfig,
    http: Client,
}

struct DailyUsage {
    day: NaiveDate,
    count: u64,
}

impl ImageGenClient {
    /// Build the client from the `image_generation` skill config.
    pub fn from_config(
        config: &SkillConfig,
        api_key: String,
        character: CharacterConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build image generation HTTP client")?;

        Ok(Self {
            enabled: config.enabled,
            api_url: config
                .setting_str("api_url")
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model: config
                .setting_str("model")
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            max_per_day: config.setting_u64("max_generations_per_day").unwrap_or(DEFAULT_MAX_PER_DAY),
            usage: Mutex::new(DailyUsage {
                day: Utc::now().date_naive(),
                count: 0,
            }),
            character,
            http,
        })
    }

    /// Reserve one generation against today's cap. Resets the counter
    /// on day rollover. Returns the sequence number for this image.
    fn reserve_generation(&self) -> Result<u64> {
        let mut usage = self
            .usage
            .lock()
            .map_err(|_| BeingError::ExternalService("image usage lock poisoned".to_string()))?;

        let today = Utc::now().date_naive();
        if usage.day != today {
            usage.day = today;
            usage.count = 0;
        }

        if usage.count >= self.max_per_day {
            return Err(BeingError::ExternalService(format!(
                "daily image generation cap reached ({})",
                self.max_per_day
            ))
            .into());
        }

        usage.count += 1;
        Ok(usage.count)
    }

    /// Fold the being's personality and palette into the raw prompt.
    fn enhance_prompt(&self, prompt: &str) -> String {
        let mut enhanced = format!(
            "{}. Digital art expressing a being that is {}",
            prompt.trim_end_matches('.'),
            describe_personality(&self.character.personality),
        );
        if let Some(scheme) = &self.character.appearance.color_scheme {
            enhanced.push_str(&format!(", in a {} color palette", scheme));
        }
        enhanced
    }
}

fn coerce_size(size: (u32, u32)) -> (u32, u32) {
    if SUPPORTED_SIZES.contains(&size) {
        size
    } else {
        (1024, 1024)
    }
}

#[async_trait]
impl ImageClient for ImageGenClient {
    async fn generate_image(&self, prompt: &str, size: (u32, u32)) -> Result<ImageOutcome> {
        if !self.enabled {
            return Err(BeingError::ExternalService(
                "image generation skill is disabled".to_string(),
            )
            .into());
        }

        let sequence = self.reserve_generation()?;
        let (width, height) = coerce_size(size);
        let enhanced = self.enhance_prompt(prompt);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": enhanced,
            "n": 1,
            "size": format!("{}x{}", width, height),
        });

        let url = format!("{}/v1/images/generations", self.api_url);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Image generation request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Image API error: {}: {}", status.as_u16(), text);
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse image generation response")?;
        let image_url = data["data"]
            .get(0)
            .and_then(|entry| entry["url"].as_str())
            .ok_or_else(|| anyhow::anyhow!("No image URL in generation response"))?
            .to_string();

        let suffix: u16 = { rand::thread_rng().gen_range(1000..10000) };
        let generation_id = format!("image_{}_{}", sequence, suffix);
        info!(generation_id = %generation_id, "Generated image");

        Ok(ImageOutcome {
            url: image_url,
            generation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn client(enabled: bool, max_per_day: u64) -> ImageGenClient {
        let mut settings = BTreeMap::new();
        settings.insert(
            "max_generations_per_day".to_string(),
            serde_json::json!(max_per_day),
        );
        let config = SkillConfig { enabled, settings };
        ImageGenClient::from_config(&config, "key".to_string(), CharacterConfig::default())
            .unwrap()
    }

    #[tokio::test]
    async fn test_disabled_skill_fails_without_network() {
        let client = client(false, 10);
        let err = client
            .generate_image("a quiet landscape", (1024, 1024))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_daily_cap_enforced() {
        let client = client(true, 2);
        assert_eq!(client.reserve_generation().unwrap(), 1);
        assert_eq!(client.reserve_generation().unwrap(), 2);
        let err = client.reserve_generation().unwrap_err();
        assert!(err.to_string().contains("cap reached"));
    }

    #[test]
    fn test_unsupported_size_coerced() {
        assert_eq!(coerce_size((640, 480)), (1024, 1024));
        assert_eq!(coerce_size((512, 512)), (512, 512));
    }

    #[test]
    fn test_prompt_enhanced_with_palette() {
        let mut character = CharacterConfig::default();
        character
            .personality
            .insert("curiosity".to_string(), 0.9);
        character.appearance.color_scheme = Some("teal and amber".to_string());

        let config = SkillConfig {
            enabled: true,
            settings: BTreeMap::new(),
        };
        let client =
            ImageGenClient::from_config(&config, "key".to_string(), character).unwrap();

        let enhanced = client.enhance_prompt("a lighthouse at dusk.");
        assert!(enhanced.starts_with("a lighthouse at dusk. Digital art"));
        assert!(enhanced.contains("very curiosity"));
        assert!(enhanced.ends_with("teal and amber color palette"));
    }
}
