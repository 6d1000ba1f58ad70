//! Error types for the search client.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during a search invocation.
#[derive(Error, Debug)]
pub enum SearchError {
    /// No network connection is available.
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// Server answered with a status other than 200 OK.
    #[error("Server returned HTTP code {0}")]
    HttpStatus(u16),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response stream failed mid-read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The configured host does not form a valid URL.
    #[error("URL parsing error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for SearchError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => Self::Io(
                std::sync::Arc::try_unwrap(io)
                    .unwrap_or_else(|shared| std::io::Error::new(shared.kind(), shared.to_string())),
            ),
            other => Self::Parse(other.to_string()),
        }
    }
}
