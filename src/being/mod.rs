//! Being Loop
//!
//! The life of the being: a single-threaded cycle that senses the
//! moment, interprets it, feels something about it, picks one activity,
//! and executes it. One activity per cycle; no step is allowed to stall
//! or crash the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use rand::thread_rng;
use tracing::{info, warn};

use crate::activity::ActivityManager;
use crate::agents::EmotionEvaluator;
use crate::display;
use crate::state::BeingState;
use crate::types::{ActivityContext, DecisionSource, Memory};

/// Pause between cycles.
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(15);

/// The assembled being: scheduling core, collaborators, and state.
pub struct Being {
    manager: ActivityManager,
    ctx: ActivityContext,
    decision: Arc<dyn DecisionSource>,
    emotion: EmotionEvaluator,
    state: BeingState,
    cycles: u64,
}

impl Being {
    pub fn new(
        manager: ActivityManager,
        ctx: ActivityContext,
        decision: Arc<dyn DecisionSource>,
        emotion: EmotionEvaluator,
    ) -> Self {
        Self {
            manager,
            ctx,
            decision,
            emotion,
            state: BeingState::new(),
            cycles: 0,
        }
    }

    /// Live until interrupted. Prints a session summary on the way out.
    pub async fn run(mut self) {
        display::startup_banner(&self.ctx.character);

        loop {
            self.cycles += 1;
            display::cycle_banner(self.cycles);
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(CYCLE_INTERVAL) => {}
                _ = shutdown_signal() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        display::session_summary(self.cycles, &self.state);
    }

    /// One full sense-interpret-feel-decide-act cycle.
    pub async fn run_cycle(&mut self) {
        let sensed = self.sense();

        let interpretation = match self
            .ctx
            .reflection
            .reflect_on_prompt(&format!(
                "Here is your current sensory snapshot: {}. \
                 In one or two sentences, what is this moment like for you?",
                sensed
            ))
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Interpretation failed, using raw senses");
                sensed.clone()
            }
        };
        display::interpretation(&interpretation);

        let reading = self.emotion.evaluate(&interpretation).await;
        display::emotion(&reading);
        self.state.add_memory(Memory {
            timestamp: Utc::now(),
            content: if reading.explanation.is_empty() {
                format!("Felt {}", reading.emotion)
            } else {
                reading.explanation.clone()
            },
            category: "emotion".to_string(),
            emotion: Some(reading.emotion.clone()),
            intensity: Some(reading.intensity),
            topic: None,
        });

        let now = Utc::now();
        let available = self.manager.available_activities(&self.state, now);

        let hint = match self
            .decision
            .decide(&interpretation, &reading, &available)
            .await
        {
            Ok(name) => Some(name),
            Err(err) => {
                warn!(error = %err, "Decision agent failed, falling back to weighted draw");
                None
            }
        };

        let selected = {
            let mut rng = thread_rng();
            self.manager
                .select_activity(hint.as_deref(), &self.state, now, &mut rng)
        };
        display::activity_start(&selected);

        let started = Utc::now();
        let result = self.manager.execute(&selected, &mut self.state, &self.ctx).await;
        let duration = (Utc::now() - started).num_milliseconds() as f64 / 1000.0;
        display::activity_result(&result, duration);

        display::status_table(&self.manager.activity_status(&self.state, Utc::now()), &self.state);
    }

    /// Snapshot of what the being can currently sense, as JSON text.
    fn sense(&self) -> String {
        serde_json::json!({
            "local_time": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "energy": (self.state.energy() * 100.0).round() / 100.0,
            "memory_count": self.state.memories().len(),
            "tweets_recorded": self.state.tweets().len(),
            "last_tweet": self.state.last_tweet().map(|t| t.text.clone()),
        })
        .to_string()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &BeingState {
        &self.state
    }
}

/// Resolves when the process is asked to stop (Ctrl-C, or SIGTERM on
/// unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::testutil::test_context;
    use crate::activity::{handlers, ActivityRegistry};
    use crate::agents::InferenceClient;
    use crate::config::default_character;
    use crate::types::EmotionReading;
    use anyhow::Result;
    use async_trait::async_trait;

    struct CannedInference(String);

    #[async_trait]
    impl InferenceClient for CannedInference {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct CannedDecision(String);

    #[async_trait]
    impl DecisionSource for CannedDecision {
        async fn decide(
            &self,
            _interpretation: &str,
            _emotion: &EmotionReading,
            _available: &[String],
        ) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn test_being(decision: &str) -> Being {
        let mut character = default_character();
        // Strip skill requirements so every activity is offerable.
        for activity in character.activities.values_mut() {
            activity.required_skills.clear();
        }

        let mut registry = ActivityRegistry::new();
        handlers::register_builtin_handlers(&mut registry);
        let manager = ActivityManager::new(&character, registry);

        let mut ctx = test_context();
        ctx.character = character;

        let emotion = EmotionEvaluator::new(Arc::new(CannedInference(
            r#"{"emotion": "calm", "intensity": 0.3, "explanation": "a quiet cycle"}"#
                .to_string(),
        )));

        Being::new(manager, ctx, Arc::new(CannedDecision(decision.to_string())), emotion)
    }

    #[tokio::test]
    async fn test_cycle_follows_exact_decision() {
        let mut being = test_being("meditation");
        being.run_cycle().await;

        // One emotion memory plus one meditation memory.
        assert_eq!(being.state().recent_memories(Some("emotion"), 10).len(), 1);
        assert_eq!(
            being.state().recent_memories(Some("meditation"), 10).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_cycle_survives_unresolvable_decision() {
        let mut being = test_being("climb a mountain");
        being.run_cycle().await;

        // The weighted draw still executed something; at minimum the
        // emotion memory was recorded and energy stayed in range.
        assert!(!being.state().memories().is_empty());
        assert!((0.0..=1.0).contains(&being.state().energy()));
    }

    #[tokio::test]
    async fn test_sense_snapshot_is_json() {
        let being = test_being("nap");
        let sensed = being.sense();
        let value: serde_json::Value = serde_json::from_str(&sensed).unwrap();
        assert!(value["local_time"].is_string());
        assert!(value["energy"].is_number());
    }
}
