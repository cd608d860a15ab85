//! Error types for code-arena
//!
//! Centralized error handling using thiserror. Configuration, repository and
//! orchestration failures each get their own variant so callers can tell
//! a bad run description apart from a bad environment.

use thiserror::Error;

/// All error types that can occur while preparing a run
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Run description failed to load or validate
    #[error("Config error: {0}")]
    Config(String),

    /// A git invocation failed or the repository is in the wrong state
    #[error("Repository error: {0}")]
    Repository(String),

    /// Run directory layout or bookkeeping failed
    #[error("Run error: {0}")]
    Orchestration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArenaError {
    /// True for errors raised while validating the run description
    pub fn is_config(&self) -> bool {
        matches!(self, ArenaError::Config(_))
    }

    /// True for errors raised by the git wrapper
    pub fn is_repository(&self) -> bool {
        matches!(self, ArenaError::Repository(_))
    }
}

/// Result type alias for code-arena operations
pub type Result<T> = std::result::Result<T, ArenaError>;
