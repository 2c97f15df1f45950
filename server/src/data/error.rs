//! Error type for catalog access

use thiserror::Error;

/// Failure while loading records from a catalog source
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response or file did not have the expected JSON shape
    #[error("Failed to decode catalog data: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source cannot be constructed from the given configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::Io(_) | Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        let status = |status| CatalogError::Status {
            status,
            body: String::new(),
        };
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(401).is_transient());
        assert!(!status(404).is_transient());
        assert!(!CatalogError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn status_message_includes_body() {
        let err = CatalogError::Status {
            status: 401,
            body: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "Catalog returned HTTP 401: Invalid API key");
    }
}
