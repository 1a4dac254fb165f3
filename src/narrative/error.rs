//! Narrative error types

use thiserror::Error;

/// Template rendering failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// Placeholder has no bound value
    #[error("Unbound placeholder: {0}")]
    Unbound(String),

    /// Unbalanced or empty braces in template text
    #[error("Malformed template: {0}")]
    Malformed(String),
}

/// Failures of the hosted completion backend
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Completion timed out after {0} ms")]
    Timeout(u64),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Reply could not be parsed into a narrative
    #[error("Malformed completion: {0}")]
    Malformed(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

/// Errors surfaced by the synthesizer after fallback
#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Completion backend error: {0}")]
    Backend(#[from] CompletionError),
}
