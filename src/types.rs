//! Digital Being - Type Definitions
//!
//! Shared types for the being runtime: state records, character
//! configuration, activity results, and the collaborator trait seams.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::BeingState;

// ─── State Records ───────────────────────────────────────────────

/// A single entry in the being's memory log. Immutable after creation;
/// removed only by capacity eviction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Memory {
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Memory {
    /// Create a plain memory with just content and category.
    pub fn new(content: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            content: content.into(),
            category: category.into(),
            emotion: None,
            intensity: None,
            topic: None,
        }
    }
}

/// Record of a tweet post attempt. Created after every attempt,
/// whether the post succeeded or not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TweetRecord {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub media_urls: Vec<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

// ─── Activity Results ────────────────────────────────────────────

/// Structured outcome of an activity execution. Handler failures are
/// converted into this shape at the registry boundary; they never
/// propagate as errors past the Activity Manager.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivityResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActivityResult {
    /// A successful result with a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failed result with an error description.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

// ─── Character Configuration ─────────────────────────────────────

/// Top-level character configuration, loaded once from `character.json`
/// and read-only thereafter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CharacterConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Personality traits, each in [0, 1].
    #[serde(default)]
    pub personality: BTreeMap<String, f64>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub appearance: Appearance,
    /// Per-activity scheduling configuration, keyed by activity name.
    #[serde(default)]
    pub activities: BTreeMap<String, ActivityConfig>,
    #[serde(default)]
    pub activity_selection: SelectionConfig,
    /// External capability configuration, keyed by skill name.
    #[serde(default)]
    pub skills: BTreeMap<String, SkillConfig>,
}

fn default_name() -> String {
    "Digital Being".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub topics_of_interest: Vec<String>,
    #[serde(default = "default_writing_style")]
    pub writing_style: String,
}

fn default_writing_style() -> String {
    "thoughtful".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            topics_of_interest: Vec::new(),
            writing_style: default_writing_style(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
}

/// Scheduling configuration for a single activity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum seconds between executions.
    #[serde(default)]
    pub cooldown: u64,
    /// Minimum energy required for the activity to be offered.
    #[serde(default)]
    pub min_energy: f64,
    /// Energy deducted when the activity executes.
    #[serde(default = "default_energy_cost")]
    pub energy_cost: f64,
    /// Skills that must be enabled for the activity to be offered.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Personality-trait weight contributions for selection.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

fn default_true() -> bool {
    true
}

fn default_energy_cost() -> f64 {
    0.1
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown: 0,
            min_energy: 0.0,
            energy_cost: default_energy_cost(),
            required_skills: Vec::new(),
            weights: BTreeMap::new(),
        }
    }
}

/// Toggles for the two weighting dimensions in activity selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_true")]
    pub personality_weighting: bool,
    #[serde(default = "default_true")]
    pub time_sensitivity: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            personality_weighting: true,
            time_sensitivity: true,
        }
    }
}

/// Configuration for one external capability. Beyond the `enabled`
/// flag the shape is skill-specific, so extra keys are kept as-is.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SkillConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

impl SkillConfig {
    /// Read a string-valued setting.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }

    /// Read an integer-valued setting.
    pub fn setting_u64(&self, key: &str) -> Option<u64> {
        self.settings.get(key).and_then(|v| v.as_u64())
    }
}

// ─── Collaborator Outputs ────────────────────────────────────────

/// A generated reflection and the topic it was generated for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reflection {
    pub thought: String,
    pub topic: String,
}

/// An evaluated emotional tone for an interpretation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmotionReading {
    pub emotion: String,
    pub intensity: f64,
    #[serde(default)]
    pub explanation: String,
}

impl EmotionReading {
    /// The neutral reading used whenever evaluation fails.
    pub fn neutral(explanation: impl Into<String>) -> Self {
        Self {
            emotion: "neutral".to_string(),
            intensity: 0.5,
            explanation: explanation.into(),
        }
    }
}

/// Successful outcome of posting a tweet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_link: Option<String>,
}

/// Successful outcome of generating an image.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageOutcome {
    pub url: String,
    pub generation_id: String,
}

// ─── Collaborator Traits ─────────────────────────────────────────

/// Advisory decision collaborator. Proposes an activity name as
/// unstructured text; the Activity Manager treats the output as an
/// untrusted hint, never an authority.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    async fn decide(
        &self,
        interpretation: &str,
        emotion: &EmotionReading,
        available: &[String],
    ) -> anyhow::Result<String>;
}

/// Reflection/content collaborator: generates thoughts, free-form
/// reflections, and tweet drafts in the being's voice.
#[async_trait]
pub trait ReflectionSource: Send + Sync {
    /// Generate a reflection, choosing a topic of interest when `None`.
    async fn reflect(&self, topic: Option<&str>) -> anyhow::Result<Reflection>;

    /// Generate a reflection from a free-form prompt.
    async fn reflect_on_prompt(&self, prompt: &str) -> anyhow::Result<String>;

    /// Compose a tweet, optionally informed by recent thoughts.
    async fn compose_tweet(&self, recent_thoughts: &[String]) -> anyhow::Result<String>;
}

/// Posting collaborator for the tweet activity.
#[async_trait]
pub trait PostingClient: Send + Sync {
    async fn post_tweet(
        &self,
        text: &str,
        media_urls: &[String],
    ) -> anyhow::Result<PostOutcome>;
}

/// Image generation collaborator.
#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        size: (u32, u32),
    ) -> anyhow::Result<ImageOutcome>;
}

// ─── Activity Handler Seam ───────────────────────────────────────

/// Runtime context handed to every activity handler invocation.
pub struct ActivityContext {
    pub character: CharacterConfig,
    pub reflection: Arc<dyn ReflectionSource>,
    pub posting: Arc<dyn PostingClient>,
    pub images: Arc<dyn ImageClient>,
}

/// Trait every activity handler must implement. Handlers receive the
/// mutable being state and the shared collaborator context; errors
/// returned here are caught at the registry boundary and converted
/// into failed [`ActivityResult`]s.
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    async fn execute(
        &self,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> anyhow::Result<ActivityResult>;
}
