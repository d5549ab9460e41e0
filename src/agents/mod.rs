//! Agents
//!
//! The LLM-backed collaborators: a thin chat-completions client and
//! the three agents built on it. Each agent output is advisory; the
//! scheduling core never trusts it as an authority.

pub mod emotion;
pub mod inference;
pub mod thought;
pub mod triage;

pub use emotion::EmotionEvaluator;
pub use inference::{InferenceClient, OpenAiClient};
pub use thought::ThoughtAgent;
pub use triage::TriageAgent;
