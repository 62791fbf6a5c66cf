//! Error types for tffunc

use crate::types::Diagnostics;

/// Boxed error crossing the provider boundary (factory and close failures)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for tffunc operations
#[derive(Debug, thiserror::Error)]
pub enum TffuncError {
    #[error("failed to launch provider plugin: {0}")]
    ProviderLaunch(BoxError),

    #[error("{0}")]
    FunctionCall(Diagnostics),

    #[error("provider returned no result and no errors")]
    NoResult,

    #[error("failed to terminate provider plugin: {0}")]
    ProviderTerminate(BoxError),

    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: String, actual: usize },

    #[error("argument {index} ({param}) must not be null")]
    NullArgument { index: usize, param: String },

    #[error("argument {index} ({param}): expected {expected}, got {actual}")]
    ArgumentTypeMismatch {
        index: usize,
        param: String,
        expected: String,
        actual: String,
    },

    #[error("function returned {actual}, but its declared return type is {expected}")]
    ReturnTypeMismatch { expected: String, actual: String },

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Invalid function name: {0}")]
    InvalidFunctionName(String),
}

/// Result type alias for tffunc operations
pub type Result<T> = std::result::Result<T, TffuncError>;
