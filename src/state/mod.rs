//! Being State
//!
//! The single mutable state owned by the being process: an energy
//! level clamped to [0, 1], a bounded memory log, and a bounded tweet
//! log. All mutation goes through this interface; collaborators never
//! probe for capabilities.

use std::collections::VecDeque;

use tracing::debug;

use crate::types::{Memory, TweetRecord};

/// Maximum retained memories; oldest are evicted first.
pub const MEMORY_CAPACITY: usize = 100;

/// Maximum retained tweet records; oldest are evicted first.
pub const TWEET_CAPACITY: usize = 50;

/// The being's in-memory state. Created once at process start and
/// owned by the orchestration loop for the process lifetime.
#[derive(Debug)]
pub struct BeingState {
    energy: f64,
    memories: VecDeque<Memory>,
    tweets: VecDeque<TweetRecord>,
}

impl Default for BeingState {
    fn default() -> Self {
        Self::new()
    }
}

impl BeingState {
    /// A fresh state with full energy and empty logs.
    pub fn new() -> Self {
        Self {
            energy: 1.0,
            memories: VecDeque::with_capacity(MEMORY_CAPACITY),
            tweets: VecDeque::with_capacity(TWEET_CAPACITY),
        }
    }

    // ─── Energy ──────────────────────────────────────────────────

    /// Current energy level, always within [0, 1].
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Set the energy level, clamping to [0, 1].
    pub fn set_energy(&mut self, value: f64) {
        self.energy = value.clamp(0.0, 1.0);
    }

    /// Deduct `cost` from the energy level, clamping at 0.
    pub fn spend_energy(&mut self, cost: f64) {
        self.set_energy(self.energy - cost);
    }

    /// Credit `amount` to the energy level, clamping at 1.
    pub fn restore_energy(&mut self, amount: f64) {
        self.set_energy(self.energy + amount);
    }

    // ─── Memories ────────────────────────────────────────────────

    /// Append a memory, evicting the oldest entry when the log is full.
    pub fn add_memory(&mut self, memory: Memory) {
        if self.memories.len() >= MEMORY_CAPACITY {
            self.memories.pop_front();
        }
        debug!(category = %memory.category, "Recorded memory");
        self.memories.push_back(memory);
    }

    /// All memories, oldest first.
    pub fn memories(&self) -> &VecDeque<Memory> {
        &self.memories
    }

    /// Recent memories newest first, optionally filtered by category.
    pub fn recent_memories(&self, category: Option<&str>, limit: usize) -> Vec<&Memory> {
        self.memories
            .iter()
            .rev()
            .filter(|m| category.map_or(true, |c| m.category == c))
            .take(limit)
            .collect()
    }

    // ─── Tweets ──────────────────────────────────────────────────

    /// Append a tweet record, evicting the oldest when the log is full.
    pub fn add_tweet(&mut self, tweet: TweetRecord) {
        if self.tweets.len() >= TWEET_CAPACITY {
            self.tweets.pop_front();
        }
        self.tweets.push_back(tweet);
    }

    /// All tweet records, oldest first.
    pub fn tweets(&self) -> &VecDeque<TweetRecord> {
        &self.tweets
    }

    /// The most recent tweet record, if any.
    pub fn last_tweet(&self) -> Option<&TweetRecord> {
        self.tweets.back()
    }
}
