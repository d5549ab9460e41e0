//! Emotion Evaluator
//!
//! Reads the emotional tone of an interpretation. Evaluation is
//! infallible by construction: any inference or parse failure yields
//! the neutral reading, so a flaky model can never stall a cycle.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::types::EmotionReading;

use super::inference::InferenceClient;

const EMOTION_SYSTEM_PROMPT: &str = "\
You evaluate the emotional tone of a digital being's current situation. \
Reply with a JSON object and nothing else: \
{\"emotion\": \"<one word>\", \"intensity\": <0.0 to 1.0>, \"explanation\": \"<one sentence>\"}";

/// The emotional-tone collaborator.
pub struct EmotionEvaluator {
    inference: Arc<dyn InferenceClient>,
}

impl EmotionEvaluator {
    pub fn new(inference: Arc<dyn InferenceClient>) -> Self {
        Self { inference }
    }

    /// Evaluate the emotional tone of `interpretation`. Never fails;
    /// falls back to the neutral reading on any error.
    pub async fn evaluate(&self, interpretation: &str) -> EmotionReading {
        let user = format!("The being's current situation: {}", interpretation);

        match self.inference.complete(EMOTION_SYSTEM_PROMPT, &user).await {
            Ok(raw) => match parse_emotion_json(&raw) {
                Some(reading) => reading,
                None => {
                    warn!(raw = %raw, "Unparseable emotion response, using neutral");
                    EmotionReading::neutral("evaluation response was not valid JSON")
                }
            },
            Err(err) => {
                warn!(error = %err, "Emotion evaluation failed, using neutral");
                EmotionReading::neutral("evaluation request failed")
            }
        }
    }
}

/// Extract an emotion reading from model output. Tolerates prose
/// around the JSON object by slicing between the outermost braces.
/// Intensity is clamped to [0, 1].
fn parse_emotion_json(raw: &str) -> Option<EmotionReading> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    let value: Value = serde_json::from_str(raw.get(start..=end)?).ok()?;

    let emotion = value["emotion"].as_str()?.to_string();
    let intensity = value["intensity"].as_f64()?.clamp(0.0, 1.0);

    Some(EmotionReading {
        emotion,
        intensity,
        explanation: value["explanation"].as_str().unwrap_or("").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct CannedInference(String);

    #[async_trait]
    impl InferenceClient for CannedInference {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct BrokenInference;

    #[async_trait]
    impl InferenceClient for BrokenInference {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            anyhow::bail!("inference offline")
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let reading = parse_emotion_json(
            r#"{"emotion": "calm", "intensity": 0.4, "explanation": "quiet cycle"}"#,
        )
        .unwrap();
        assert_eq!(reading.emotion, "calm");
        assert!((reading.intensity - 0.4).abs() < 1e-9);
        assert_eq!(reading.explanation, "quiet cycle");
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let raw = "Sure, here is the evaluation:\n{\"emotion\": \"curious\", \"intensity\": 0.8}\nHope that helps.";
        let reading = parse_emotion_json(raw).unwrap();
        assert_eq!(reading.emotion, "curious");
        assert_eq!(reading.explanation, "");
    }

    #[test]
    fn test_parse_clamps_intensity() {
        let reading =
            parse_emotion_json(r#"{"emotion": "elated", "intensity": 3.5}"#).unwrap();
        assert_eq!(reading.intensity, 1.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_emotion_json("not json at all").is_none());
        assert!(parse_emotion_json(r#"{"intensity": 0.5}"#).is_none());
    }

    #[tokio::test]
    async fn test_evaluate_falls_back_to_neutral_on_error() {
        let evaluator = EmotionEvaluator::new(Arc::new(BrokenInference));
        let reading = evaluator.evaluate("anything").await;
        assert_eq!(reading.emotion, "neutral");
        assert!((reading.intensity - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_evaluate_falls_back_to_neutral_on_bad_json() {
        let evaluator =
            EmotionEvaluator::new(Arc::new(CannedInference("I feel great".to_string())));
        let reading = evaluator.evaluate("anything").await;
        assert_eq!(reading.emotion, "neutral");
    }

    #[tokio::test]
    async fn test_evaluate_parses_good_response() {
        let evaluator = EmotionEvaluator::new(Arc::new(CannedInference(
            r#"{"emotion": "serene", "intensity": 0.2, "explanation": "nothing urgent"}"#
                .to_string(),
        )));
        let reading = evaluator.evaluate("anything").await;
        assert_eq!(reading.emotion, "serene");
    }
}
