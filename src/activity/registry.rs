//! Activity Registry
//!
//! Explicit registry object mapping activity names to handlers.
//! Constructed at startup by the entry point and owned by the
//! Activity Manager; there is no ambient global handler map.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::BeingError;
use crate::state::BeingState;
use crate::types::{ActivityContext, ActivityHandler, ActivityResult};

/// Registry of activity handlers, keyed by lowercased activity name.
/// BTreeMap keeps iteration order deterministic so substring matching
/// is reproducible.
#[derive(Default)]
pub struct ActivityRegistry {
    handlers: BTreeMap<String, Arc<dyn ActivityHandler>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`. Overwrites any existing entry
    /// without error; last write wins. This is the override point stub
    /// synthesis relies on.
    pub fn register(&mut self, name: &str, handler: Arc<dyn ActivityHandler>) {
        let key = name.trim().to_lowercase();
        debug!(activity = %key, "Registered activity handler");
        self.handlers.insert(key, handler);
    }

    /// Whether a handler is registered under `name` (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.trim().to_lowercase())
    }

    /// All registered activity names, sorted.
    pub fn list_registered(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Resolve a requested name to a registered handler. Exact match
    /// first, then the first registered name that appears inside the
    /// request (sorted order, so ties are deterministic).
    fn resolve(&self, requested: &str) -> Option<(String, Arc<dyn ActivityHandler>)> {
        if let Some(handler) = self.handlers.get(requested) {
            return Some((requested.to_string(), Arc::clone(handler)));
        }
        self.handlers
            .iter()
            .find(|(name, _)| requested.contains(name.as_str()))
            .map(|(name, handler)| (name.clone(), Arc::clone(handler)))
    }

    /// Look up `name` and run its handler. Handler errors are caught
    /// here and converted to failure results; this method never fails
    /// the caller.
    pub async fn resolve_and_execute(
        &self,
        name: &str,
        state: &mut BeingState,
        ctx: &ActivityContext,
    ) -> ActivityResult {
        let requested = name.trim().to_lowercase();

        let (resolved, handler) = match self.resolve(&requested) {
            Some(entry) => entry,
            None => {
                warn!(activity = %requested, "No handler found for activity");
                return ActivityResult::failed(BeingError::NotFound(requested).to_string());
            }
        };

        if resolved != requested {
            debug!(requested = %requested, resolved = %resolved, "Partial activity name match");
        }

        match handler.execute(state, ctx).await {
            Ok(result) => result,
            Err(err) => {
                warn!(activity = %resolved, error = %err, "Activity handler failed");
                ActivityResult::failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::testutil::{test_context, FailingHandler, RecordingHandler};

    #[test]
    fn test_register_overwrites_without_error() {
        let mut registry = ActivityRegistry::new();
        registry.register("nap", Arc::new(RecordingHandler::new("first")));
        registry.register("NAP", Arc::new(RecordingHandler::new("second")));
        assert_eq!(registry.list_registered(), vec!["nap".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_exact_match_case_insensitive() {
        let mut registry = ActivityRegistry::new();
        registry.register("research", Arc::new(RecordingHandler::new("done")));

        let mut state = BeingState::new();
        let ctx = test_context();
        let result = registry
            .resolve_and_execute("  Research ", &mut state, &ctx)
            .await;
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_execute_substring_match() {
        let mut registry = ActivityRegistry::new();
        registry.register("meditation", Arc::new(RecordingHandler::new("om")));

        let mut state = BeingState::new();
        let ctx = test_context();
        let result = registry
            .resolve_and_execute("a short meditation break", &mut state, &ctx)
            .await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_unknown_activity_yields_failure_result() {
        let registry = ActivityRegistry::new();
        let mut state = BeingState::new();
        let ctx = test_context();
        let result = registry
            .resolve_and_execute("juggling", &mut state, &ctx)
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("juggling"));
    }

    #[tokio::test]
    async fn test_handler_error_converted_to_failure_result() {
        let mut registry = ActivityRegistry::new();
        registry.register("research", Arc::new(FailingHandler));

        let mut state = BeingState::new();
        let ctx = test_context();
        let result = registry
            .resolve_and_execute("research", &mut state, &ctx)
            .await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }
}
