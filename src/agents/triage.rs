//! Triage Agent
//!
//! Proposes the next activity as free text. The output is an advisory
//! hint only; the Activity Manager resolves it against the actual
//! availability set and falls back to a weighted draw when it does not
//! match anything.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{DecisionSource, EmotionReading};

use super::inference::InferenceClient;

const TRIAGE_SYSTEM_PROMPT: &str = "\
You decide what a digital being should do next. Reply with the name of \
exactly one activity from the list you are given, and nothing else.

Guidance:
- If the being's energy is low (below 0.3), prefer nap.
- If the being has not shared anything publicly in a while, prefer post_a_tweet.
- If the emotional tone is agitated or intense, prefer meditation.
- If the being seems curious or bored, prefer research.
- Otherwise prefer daily_thought.";

/// The activity-proposal collaborator.
pub struct TriageAgent {
    inference: Arc<dyn InferenceClient>,
}

impl TriageAgent {
    pub fn new(inference: Arc<dyn InferenceClient>) -> Self {
        Self { inference }
    }
}

#[async_trait]
impl DecisionSource for TriageAgent {
    async fn decide(
        &self,
        interpretation: &str,
        emotion: &EmotionReading,
        available: &[String],
    ) -> Result<String> {
        let user = format!(
            "Current situation: {}\n\
             Emotional tone: {} (intensity {:.2})\n\
             Available activities: {}\n\n\
             Which one activity should the being do next?",
            interpretation,
            emotion.emotion,
            emotion.intensity,
            available.join(", "),
        );

        let raw = self.inference.complete(TRIAGE_SYSTEM_PROMPT, &user).await?;
        Ok(raw.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedInference(String);

    #[async_trait]
    impl InferenceClient for CannedInference {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_decision_normalized_to_lowercase() {
        let agent = TriageAgent::new(Arc::new(CannedInference("  Research \n".to_string())));
        let decision = agent
            .decide(
                "all quiet",
                &EmotionReading::neutral("test"),
                &["research".to_string(), "nap".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(decision, "research");
    }
}
