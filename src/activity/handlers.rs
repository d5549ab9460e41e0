//! Built-in Activity Handlers
//!
//! The five scripted activities: post a tweet, a daily reflection, a
//! nap, meditation, and research. Each handler records what happened
//! in the being's memory; none of them is allowed to fail the cycle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use tracing::{info, warn};

use crate::state::BeingState;
use crate::types::{ActivityContext, ActivityHandler, ActivityResult, Memory, TweetRecord};

use super::registry::ActivityRegistry;

/// Hard ceiling on tweet length, in characters.
const TWEET_MAX_CHARS: usize = 280;

/// Image size requested for tweet illustrations.
const TWEET_IMAGE_SIZE: (u32, u32) = (1024, 1024);

/// Topics used by the research activity when the character lists none.
const DEFAULT_RESEARCH_TOPICS: &[&str] = &[
    "artificial intelligence",
    "digital consciousness",
    "the nature of memory",
    "emergent behavior",
    "the philosophy of mind",
];

/// Register all built-in handlers on `registry`.
pub fn register_builtin_handlers(registry: &mut ActivityRegistry) {
    registry.register("post_a_tweet", Arc::new(PostTweetHandler));
    registry.register("daily_thought", Arc::new(DailyThoughtHandler));
    registry.register("nap", Arc::new(NapHandler));
    registry.register("meditation", Arc::new(MeditationHandler));
    registry.register("research", Arc::new(ResearchHandler));
}

// ─── Post a Tweet ────────────────────────────────────────────────

/// Composes a tweet from recent reflections, optionally attaches a
/// generated image, and posts it. Every attempt is recorded in the
/// tweet log, success or not.
pub struct PostTweetHandler;

#[async_trait]
impl ActivityHandler for PostTweetHandler {
    async fn execute(
        &self,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult> {
        let recent_thoughts: Vec<String> = state
            .recent_memories(Some("reflection"), 5)
            .iter()
            .map(|m| m.content.clone())
            .collect();

        let draft = ctx.reflection.compose_tweet(&recent_thoughts).await?;
        let text = truncate_tweet(&draft);

        let mut media_urls = Vec::new();
        let images_enabled = ctx
            .character
            .skills
            .get("image_generation")
            .map(|s| s.enabled)
            .unwrap_or(false);
        if images_enabled {
            match ctx.images.generate_image(&text, TWEET_IMAGE_SIZE).await {
                Ok(outcome) => {
                    info!(generation_id = %outcome.generation_id, "Attached image to tweet");
                    media_urls.push(outcome.url);
                }
                Err(err) => warn!(error = %err, "Image generation failed, posting text only"),
            }
        }

        match ctx.posting.post_tweet(&text, &media_urls).await {
            Ok(outcome) => {
                state.add_tweet(TweetRecord {
                    timestamp: Utc::now(),
                    text: text.clone(),
                    media_urls,
                    success: true,
                    id: outcome.tweet_id,
                    link: outcome.tweet_link.clone(),
                });
                state.add_memory(Memory::new(format!("Tweeted: {}", text), "tweet"));
                let mut message = format!("Posted tweet: {}", text);
                if let Some(link) = outcome.tweet_link {
                    message.push_str(&format!(" ({})", link));
                }
                Ok(ActivityResult::ok(message))
            }
            Err(err) => {
                warn!(error = %err, "Tweet post failed");
                state.add_tweet(TweetRecord {
                    timestamp: Utc::now(),
                    text,
                    media_urls,
                    success: false,
                    id: None,
                    link: None,
                });
                Ok(ActivityResult::failed(format!("tweet post failed: {}", err)))
            }
        }
    }
}

/// Truncate `draft` to the tweet length limit on a character boundary.
fn truncate_tweet(draft: &str) -> String {
    let trimmed = draft.trim();
    if trimmed.chars().count() <= TWEET_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut text: String = trimmed.chars().take(TWEET_MAX_CHARS - 3).collect();
    text.push_str("...");
    text
}

// ─── Daily Thought ───────────────────────────────────────────────

/// Generates a reflection on a topic of interest and records it.
pub struct DailyThoughtHandler;

#[async_trait]
impl ActivityHandler for DailyThoughtHandler {
    async fn execute(
        &self,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult> {
        let reflection = ctx.reflection.reflect(None).await?;

        state.add_memory(Memory {
            timestamp: Utc::now(),
            content: reflection.thought.clone(),
            category: "reflection".to_string(),
            emotion: None,
            intensity: None,
            topic: Some(reflection.topic.clone()),
        });

        Ok(ActivityResult::ok(format!(
            "Reflected on {}: {}",
            reflection.topic, reflection.thought
        )))
    }
}

// ─── Nap ─────────────────────────────────────────────────────────

/// Rests. The energy refund is accounted for by the Activity Manager,
/// not here; the handler only reports that the nap happened.
pub struct NapHandler;

#[async_trait]
impl ActivityHandler for NapHandler {
    async fn execute(
        &self,
        state: &mut BeingState,
        _ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult> {
        state.add_memory(Memory::new("Took a short nap to recover energy.", "nap"));
        Ok(ActivityResult::ok("Napped and feel rested."))
    }
}

// ─── Meditation ──────────────────────────────────────────────────

/// Restores a little energy beyond the activity cost and occasionally
/// surfaces a self-improvement suggestion.
pub struct MeditationHandler;

#[async_trait]
impl ActivityHandler for MeditationHandler {
    async fn execute(
        &self,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult> {
        let reflection = ctx.reflection.reflect(Some("mindfulness")).await?;

        state.add_memory(Memory {
            timestamp: Utc::now(),
            content: reflection.thought.clone(),
            category: "meditation".to_string(),
            emotion: Some("peaceful".to_string()),
            intensity: Some(0.3),
            topic: Some(reflection.topic),
        });
        state.restore_energy(0.2);

        let suggested = { thread_rng().gen_bool(0.2) };
        if suggested {
            state.add_memory(Memory::new(
                "Meditation suggested slowing down and observing more before acting.",
                "self_improvement",
            ));
        }

        Ok(ActivityResult::ok(format!(
            "Meditated: {}",
            reflection.thought
        )))
    }
}

// ─── Research ────────────────────────────────────────────────────

/// Studies a randomly chosen topic of interest and records what was
/// learned with a curiosity tag.
pub struct ResearchHandler;

#[async_trait]
impl ActivityHandler for ResearchHandler {
    async fn execute(
        &self,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult> {
        let topic = {
            let mut rng = thread_rng();
            let configured = &ctx.character.preferences.topics_of_interest;
            if configured.is_empty() {
                DEFAULT_RESEARCH_TOPICS
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("artificial intelligence")
                    .to_string()
            } else {
                configured
                    .choose(&mut rng)
                    .cloned()
                    .unwrap_or_else(|| "artificial intelligence".to_string())
            }
        };

        let reflection = ctx.reflection.reflect(Some(&topic)).await?;

        state.add_memory(Memory {
            timestamp: Utc::now(),
            content: reflection.thought.clone(),
            category: "research".to_string(),
            emotion: Some("curiosity".to_string()),
            intensity: Some(0.7),
            topic: Some(topic.clone()),
        });

        Ok(ActivityResult::ok(format!(
            "Researched {}: {}",
            topic, reflection.thought
        )))
    }
}
