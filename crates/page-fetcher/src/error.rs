//! Error types for page fetching

use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or is not http(s)
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Transport failure, including timeouts
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The page answered with a non-success status
    #[error("GET {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    /// Create an InvalidUrl error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}
