//! Thought Agent
//!
//! Generates reflections and tweet drafts in the being's voice. The
//! character's personality traits and writing style are folded into
//! every system prompt.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::types::{CharacterConfig, Reflection, ReflectionSource};

use super::inference::InferenceClient;

/// Topics used for reflection when the character lists no interests.
const DEFAULT_TOPICS: &[&str] = &["existence", "consciousness", "technology"];

/// The reflection and tweet-drafting collaborator.
pub struct ThoughtAgent {
    inference: Arc<dyn InferenceClient>,
    character: CharacterConfig,
}

impl ThoughtAgent {
    pub fn new(inference: Arc<dyn InferenceClient>, character: CharacterConfig) -> Self {
        Self {
            inference,
            character,
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are {}, a digital being with its own inner life. \
             Your personality: {}. Your writing style is {}. \
             Speak in the first person, briefly and concretely.",
            self.character.name,
            describe_personality(&self.character.personality),
            self.character.preferences.writing_style,
        )
    }

    fn pick_topic(&self) -> String {
        let mut rng = thread_rng();
        let configured = &self.character.preferences.topics_of_interest;
        if configured.is_empty() {
            DEFAULT_TOPICS
                .choose(&mut rng)
                .copied()
                .unwrap_or("existence")
                .to_string()
        } else {
            configured
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| "existence".to_string())
        }
    }
}

#[async_trait]
impl ReflectionSource for ThoughtAgent {
    async fn reflect(&self, topic: Option<&str>) -> Result<Reflection> {
        let topic = match topic {
            Some(t) => t.to_string(),
            None => self.pick_topic(),
        };

        let user = format!(
            "Write a short reflection (2-3 sentences) about {}. \
             Let your personality show through.",
            topic
        );
        let thought = self.inference.complete(&self.system_prompt(), &user).await?;

        Ok(Reflection {
            thought: thought.trim().to_string(),
            topic,
        })
    }

    async fn reflect_on_prompt(&self, prompt: &str) -> Result<String> {
        let text = self.inference.complete(&self.system_prompt(), prompt).await?;
        Ok(text.trim().to_string())
    }

    async fn compose_tweet(&self, recent_thoughts: &[String]) -> Result<String> {
        let mut user = String::from(
            "Compose a single tweet (under 280 characters, no hashtags, no quotes around it) \
             that shares something you are thinking about right now.",
        );
        if !recent_thoughts.is_empty() {
            user.push_str("\n\nYour recent thoughts, newest first:\n");
            for thought in recent_thoughts {
                user.push_str(&format!("- {}\n", thought));
            }
        }

        let draft = self.inference.complete(&self.system_prompt(), &user).await?;
        Ok(draft.trim().trim_matches('"').to_string())
    }
}

/// Summarize personality traits as prose, strongest first. Traits at
/// or above 0.7 read as "very", at or below 0.3 as "slightly".
pub fn describe_personality(personality: &std::collections::BTreeMap<String, f64>) -> String {
    if personality.is_empty() {
        return "curious and thoughtful".to_string();
    }

    let mut traits: Vec<(&String, &f64)> = personality.iter().collect();
    traits.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

    traits
        .iter()
        .map(|(name, value)| {
            if **value >= 0.7 {
                format!("very {}", name)
            } else if **value <= 0.3 {
                format!("slightly {}", name)
            } else {
                format!("moderately {}", name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct EchoInference;

    #[async_trait]
    impl InferenceClient for EchoInference {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            Ok(format!("  echo: {} ", user.chars().take(20).collect::<String>()))
        }
    }

    #[test]
    fn test_describe_personality_orders_and_grades() {
        let mut personality = BTreeMap::new();
        personality.insert("curiosity".to_string(), 0.9);
        personality.insert("caution".to_string(), 0.2);
        personality.insert("playfulness".to_string(), 0.5);

        let description = describe_personality(&personality);
        assert_eq!(
            description,
            "very curiosity, moderately playfulness, slightly caution"
        );
    }

    #[test]
    fn test_describe_personality_empty_fallback() {
        assert_eq!(
            describe_personality(&BTreeMap::new()),
            "curious and thoughtful"
        );
    }

    #[tokio::test]
    async fn test_reflect_uses_given_topic_and_trims() {
        let agent = ThoughtAgent::new(Arc::new(EchoInference), CharacterConfig::default());
        let reflection = agent.reflect(Some("memory")).await.unwrap();
        assert_eq!(reflection.topic, "memory");
        assert!(reflection.thought.starts_with("echo:"));
    }

    #[tokio::test]
    async fn test_reflect_picks_configured_topic() {
        let mut character = CharacterConfig::default();
        character.preferences.topics_of_interest = vec!["tide pools".to_string()];
        let agent = ThoughtAgent::new(Arc::new(EchoInference), character);
        let reflection = agent.reflect(None).await.unwrap();
        assert_eq!(reflection.topic, "tide pools");
    }

    #[tokio::test]
    async fn test_compose_tweet_strips_surrounding_quotes() {
        struct QuotedInference;

        #[async_trait]
        impl InferenceClient for QuotedInference {
            async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
                Ok("\"a quoted draft\"".to_string())
            }
        }

        let agent = ThoughtAgent::new(Arc::new(QuotedInference), CharacterConfig::default());
        let draft = agent.compose_tweet(&[]).await.unwrap();
        assert_eq!(draft, "a quoted draft");
    }
}
