//! Error types for crew-runner

use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors that can occur while running agents
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No API key configured for the chat endpoint
    #[error("Chat credential is not configured (set CHAT_API_KEY)")]
    MissingCredential,

    /// Transport failure, timeout, or undecodable response body
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The completion carried no choices
    #[error("Chat completion returned no choices")]
    EmptyCompletion,

    /// The rich orchestrator could not produce a result
    #[error("Orchestrator error: {message}")]
    Orchestrator { message: String },

    /// Unknown run mode in a request
    #[error("Invalid run mode: {mode}")]
    InvalidMode { mode: String },
}

impl RunnerError {
    /// Create an Orchestrator error
    pub fn orchestrator(message: impl Into<String>) -> Self {
        Self::Orchestrator {
            message: message.into(),
        }
    }
}
