//! Error Taxonomy
//!
//! Only `Configuration` is allowed to halt the process, and only at
//! startup. Everything else is recovered: `NotFound` and
//! `ExternalService` become failed activity results, and `Validation`
//! falls back to weighted random selection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeingError {
    /// Malformed or missing required configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested activity has no registered handler.
    #[error("no activity named '{0}' is registered")]
    NotFound(String),

    /// A collaborator (LLM, posting, image generation) failed.
    #[error("external service failure: {0}")]
    ExternalService(String),

    /// An advisory hint could not be resolved to an available activity.
    #[error("decision '{0}' does not resolve to an available activity")]
    Validation(String),
}
