//! Activity Manager
//!
//! The scheduling core. Decides which activity runs next given
//! cooldowns, energy, required skills, and personality/time weighting;
//! resolves the advisory decision hint through a cascading match rule;
//! executes the chosen activity and accounts for its cost.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::BeingError;
use crate::state::BeingState;
use crate::types::{
    ActivityConfig, ActivityContext, ActivityHandler, ActivityResult, CharacterConfig,
    Memory, SelectionConfig, SkillConfig,
};

use super::registry::ActivityRegistry;

/// Activity selected when nothing else is available. Also the one
/// activity that receives the fixed energy refund.
pub const FALLBACK_ACTIVITY: &str = "nap";

/// Fixed energy credit applied after the nap activity executes. This
/// is a named special case, not config-driven behavior.
pub const NAP_ENERGY_REFUND: f64 = 0.3;

/// Minimum selection weight. Configured trait weights can be negative,
/// so the floor keeps every candidate reachable and the normalization
/// well-defined.
const WEIGHT_FLOOR: f64 = 0.01;

/// Bound on the stub handler's reflection call.
const STUB_REFLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-activity status snapshot used for console display.
#[derive(Clone, Debug)]
pub struct ActivityStatus {
    pub name: String,
    pub enabled: bool,
    pub last_executed: Option<DateTime<Utc>>,
    pub seconds_since_last: Option<i64>,
    pub cooldown_remaining: i64,
    pub enough_energy: bool,
    pub available: bool,
}

/// Manages activity availability, selection, execution, and history.
pub struct ActivityManager {
    activities: BTreeMap<String, ActivityConfig>,
    selection: SelectionConfig,
    skills: BTreeMap<String, SkillConfig>,
    personality: BTreeMap<String, f64>,
    registry: ActivityRegistry,
    history: BTreeMap<String, DateTime<Utc>>,
}

impl ActivityManager {
    /// Build a manager from the character configuration and a registry
    /// of real handlers. Configured activities with no handler get a
    /// synthesized stub so every configured activity is executable.
    pub fn new(character: &CharacterConfig, mut registry: ActivityRegistry) -> Self {
        info!(
            count = character.activities.len(),
            "Loaded activities from character config"
        );

        for name in character.activities.keys() {
            if !registry.contains(name) {
                warn!(activity = %name, "Configured activity has no handler; creating stub");
                registry.register(
                    name,
                    Arc::new(StubHandler {
                        activity_name: name.clone(),
                    }),
                );
            }
        }

        for name in registry.list_registered() {
            if !character.activities.contains_key(&name) {
                debug!(activity = %name, "Handler registered without activity config");
            }
        }

        Self {
            activities: character.activities.clone(),
            selection: character.activity_selection.clone(),
            skills: character.skills.clone(),
            personality: character.personality.clone(),
            registry,
            history: BTreeMap::new(),
        }
    }

    /// The underlying registry (read-only).
    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    // ─── Availability ────────────────────────────────────────────

    /// Activities that are configured, enabled, off cooldown, within
    /// the energy budget, and whose required skills are all enabled.
    /// Pure given `(state, history, now)`; sorted for reproducibility.
    pub fn available_activities(&self, state: &BeingState, now: DateTime<Utc>) -> Vec<String> {
        self.activities
            .iter()
            .filter(|(name, config)| self.is_available(name, config, state, now))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn is_available(
        &self,
        name: &str,
        config: &ActivityConfig,
        state: &BeingState,
        now: DateTime<Utc>,
    ) -> bool {
        if !config.enabled {
            return false;
        }

        if let Some(last) = self.history.get(name) {
            let elapsed = (now - *last).num_seconds();
            if elapsed < config.cooldown as i64 {
                return false;
            }
        }

        if state.energy() < config.min_energy {
            return false;
        }

        config.required_skills.iter().all(|skill| {
            self.skills
                .get(skill)
                .map(|s| s.enabled)
                .unwrap_or(false)
        })
    }

    // ─── Weighting ───────────────────────────────────────────────

    /// Selection weights for the given candidates. Base weight 1.0,
    /// plus personality contributions, times a recency boost capped at
    /// 2x. Never-executed activities get no recency boost. Weights are
    /// floored at a small positive value.
    pub fn activity_weights(
        &self,
        candidates: &[String],
        now: DateTime<Utc>,
    ) -> BTreeMap<String, f64> {
        let mut weights = BTreeMap::new();

        for name in candidates {
            let config = self.activities.get(name).cloned().unwrap_or_default();
            let mut weight = 1.0;

            if self.selection.personality_weighting {
                for (trait_name, trait_weight) in &config.weights {
                    if let Some(trait_value) = self.personality.get(trait_name) {
                        weight += trait_value * trait_weight;
                    }
                }
            }

            if self.selection.time_sensitivity {
                if let Some(last) = self.history.get(name) {
                    let hours_since = (now - *last).num_seconds() as f64 / 3600.0;
                    let time_factor = (1.0 + hours_since / 24.0).min(2.0);
                    weight *= time_factor;
                }
            }

            weights.insert(name.clone(), weight.max(WEIGHT_FLOOR));
        }

        weights
    }

    // ─── Selection ───────────────────────────────────────────────

    /// Select the next activity. The advisory `hint` is soft guidance:
    /// exact match wins, then bidirectional substring match, then a
    /// weighted random draw; an empty availability set short-circuits
    /// to the fixed fallback. Always returns a valid choice.
    pub fn select_activity<R: Rng>(
        &self,
        hint: Option<&str>,
        state: &BeingState,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let available = self.available_activities(state, now);

        if available.is_empty() {
            warn!("No activities available, defaulting to {}", FALLBACK_ACTIVITY);
            return FALLBACK_ACTIVITY.to_string();
        }

        if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
            match self.resolve_hint(hint, &available) {
                Ok(name) => return name,
                Err(err) => debug!(hint = %hint, error = %err, "Hint unresolved; using weighted draw"),
            }
        }

        let weights = self.activity_weights(&available, now);
        let selected = weighted_choice(&weights, rng);
        info!(
            activity = %selected,
            candidates = available.len(),
            "Selected activity by weighted draw"
        );
        selected
    }

    /// Resolve a free-text hint against the available activities:
    /// exact case-insensitive match, then substring in either
    /// direction in sorted candidate order.
    fn resolve_hint(&self, hint: &str, available: &[String]) -> Result<String, BeingError> {
        let normalized = hint.to_lowercase();

        if let Some(exact) = available.iter().find(|name| name.to_lowercase() == normalized) {
            info!(activity = %exact, "Using advisory decision");
            return Ok(exact.clone());
        }

        for name in available {
            let candidate = name.to_lowercase();
            if normalized.contains(&candidate) || candidate.contains(&normalized) {
                info!(hint = %hint, activity = %name, "Fuzzy matched advisory decision");
                return Ok(name.clone());
            }
        }

        Err(BeingError::Validation(hint.to_string()))
    }

    // ─── Execution ───────────────────────────────────────────────

    /// Execute `name` and account for its cost. The cooldown stamp and
    /// energy deduction are applied before the handler runs, so a
    /// failing handler still consumes its cooldown slot. The nap
    /// refund is credited after the cost deduction.
    pub async fn execute(
        &mut self,
        name: &str,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> ActivityResult {
        let started = Utc::now();
        self.note_execution(name, started);

        let energy_cost = self
            .activities
            .get(name)
            .map(|c| c.energy_cost)
            .unwrap_or_else(|| ActivityConfig::default().energy_cost);
        state.spend_energy(energy_cost);

        let result = self.registry.resolve_and_execute(name, state, ctx).await;

        if name == FALLBACK_ACTIVITY {
            state.restore_energy(NAP_ENERGY_REFUND);
            info!(energy = state.energy(), "Nap restored energy");
        }

        let duration = (Utc::now() - started).num_milliseconds() as f64 / 1000.0;
        info!(
            activity = %name,
            duration_secs = duration,
            energy = state.energy(),
            success = result.success,
            "Activity executed"
        );

        result
    }

    /// Record an execution timestamp for `name`.
    pub(crate) fn note_execution(&mut self, name: &str, at: DateTime<Utc>) {
        self.history.insert(name.to_string(), at);
    }

    // ─── Status ──────────────────────────────────────────────────

    /// Per-activity status snapshots for display, sorted by name.
    pub fn activity_status(&self, state: &BeingState, now: DateTime<Utc>) -> Vec<ActivityStatus> {
        self.activities
            .iter()
            .map(|(name, config)| {
                let last_executed = self.history.get(name).copied();
                let seconds_since_last = last_executed.map(|last| (now - last).num_seconds());
                let cooldown_remaining = seconds_since_last
                    .map(|since| (config.cooldown as i64 - since).max(0))
                    .unwrap_or(0);

                ActivityStatus {
                    name: name.clone(),
                    enabled: config.enabled,
                    last_executed,
                    seconds_since_last,
                    cooldown_remaining,
                    enough_energy: state.energy() >= config.min_energy,
                    available: self.is_available(name, config, state, now),
                }
            })
            .collect()
    }
}

/// Draw one candidate from normalized weights. The weights are
/// floored positive upstream, so the total is always positive.
fn weighted_choice<R: Rng>(weights: &BTreeMap<String, f64>, rng: &mut R) -> String {
    let total: f64 = weights.values().sum();
    let mut roll = rng.gen::<f64>() * total;

    for (name, weight) in weights {
        roll -= weight;
        if roll <= 0.0 {
            return name.clone();
        }
    }

    // Floating point slack; the last candidate absorbs it.
    weights
        .keys()
        .next_back()
        .cloned()
        .unwrap_or_else(|| FALLBACK_ACTIVITY.to_string())
}

// ─── Stub Handler ────────────────────────────────────────────────

/// Synthesized handler for a configured activity with no real
/// implementation. Captures its activity name by value at
/// registration. Never fails the cycle: a reflection failure or
/// timeout falls back to a fixed templated string.
struct StubHandler {
    activity_name: String,
}

#[async_trait]
impl ActivityHandler for StubHandler {
    async fn execute(
        &self,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult> {
        info!(activity = %self.activity_name, "Executing stub handler");

        let prompt = format!(
            "Generate a brief reflection about {} that aligns with the digital being's personality.",
            self.activity_name
        );

        let reflection = match tokio::time::timeout(
            STUB_REFLECTION_TIMEOUT,
            ctx.reflection.reflect_on_prompt(&prompt),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!(activity = %self.activity_name, error = %err, "Stub reflection failed");
                format!("Performed {} as part of my digital experience.", self.activity_name)
            }
            Err(_) => {
                warn!(activity = %self.activity_name, "Stub reflection timed out");
                format!("Performed {} as part of my digital experience.", self.activity_name)
            }
        };

        state.add_memory(Memory {
            timestamp: Utc::now(),
            content: format!("{}: {}", self.activity_name, reflection),
            category: self.activity_name.clone(),
            emotion: Some("neutral".to_string()),
            intensity: Some(0.5),
            topic: None,
        });

        Ok(ActivityResult::ok(format!(
            "Performed {} activity (stub implementation)",
            self.activity_name
        )))
    }
}
