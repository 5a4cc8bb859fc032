//! Error types for the brain.
//!
//! Lookup misses, pattern mismatches and cancelled operations are ordinary
//! outcomes and never show up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("dictionary entries need non-blank text")]
    EmptyEntry,

    #[error("invalid trigger pattern {spec:?}: {reason}")]
    InvalidPattern { spec: String, reason: String },

    #[error("concept '{name}' is registered more than once")]
    DuplicateConcept { name: String },

    #[error("concept '{requested_by}' requires concept '{name}', which is not registered")]
    MissingConcept { name: String, requested_by: String },

    #[error("handler of concept '{concept}' failed: {message}")]
    Handler { concept: String, message: String },

    #[error("response could not be emitted: {message}")]
    Response { message: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl BrainError {
    /// Shorthand for a handler failure raised from inside a concept or
    /// intent callback.
    pub fn handler(concept: impl Into<String>, message: impl Into<String>) -> Self {
        BrainError::Handler {
            concept: concept.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = BrainError> = std::result::Result<T, E>;
