//! Digital Being
//!
//! An autonomous digital being that lives in a perpetual cycle:
//! sense the moment, interpret it, feel something about it, pick one
//! activity, do it, rest, repeat. LLM collaborators advise; the
//! scheduling core decides.

pub mod activity;
pub mod agents;
pub mod being;
pub mod config;
pub mod display;
pub mod error;
pub mod skills;
pub mod state;
pub mod types;
