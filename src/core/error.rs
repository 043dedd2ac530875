//! Custom error types for sitewatch
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for sitewatch operations
#[derive(Error, Debug)]
pub enum WatchError {
    /// No target URL was supplied on the command line
    #[error("missing target URL argument")]
    MissingArgument,

    /// The target URL does not use a supported scheme
    #[error("invalid URL '{0}': must start with http:// or https://")]
    InvalidScheme(String),

    /// Browser failed to launch or did not come up within the launch timeout
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// The main document was served with an error status
    #[error("page returned HTTP {0}")]
    Http(i64),

    /// Navigation failed for a reason other than a timeout
    #[error("navigation error: {0}")]
    Navigation(String),

    /// Screenshot capture failed
    #[error("screenshot error: {0}")]
    Screenshot(String),

    /// A device emulation override could not be applied to the page
    #[error("emulation override failed: {0}")]
    Emulation(String),

    /// An operation was attempted after the session's resources were released
    #[error("browser session is already closed")]
    AlreadyClosed,

    /// A resource (page, browser) failed to close during cleanup
    #[error("failed to close {resource}: {message}")]
    Close { resource: &'static str, message: String },

    /// Errors surfaced by the DevTools protocol client
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for sitewatch operations
pub type Result<T> = std::result::Result<T, WatchError>;

impl WatchError {
    /// Create a launch error
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Create a navigation error
    pub fn navigation(msg: impl Into<String>) -> Self {
        Self::Navigation(msg.into())
    }

    /// Create a screenshot error
    pub fn screenshot(msg: impl Into<String>) -> Self {
        Self::Screenshot(msg.into())
    }

    /// Create a close error for the named resource
    pub fn close(resource: &'static str, msg: impl Into<String>) -> Self {
        Self::Close {
            resource,
            message: msg.into(),
        }
    }

    /// True for the two validation failures that abort before any browser work
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingArgument | Self::InvalidScheme(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(WatchError::MissingArgument.is_fatal());
        assert!(WatchError::InvalidScheme("ftp://x".into()).is_fatal());
        assert!(!WatchError::Http(404).is_fatal());
        assert!(!WatchError::launch("boom").is_fatal());
    }

    #[test]
    fn test_http_error_display_carries_status() {
        let err = WatchError::Http(503);
        assert!(err.to_string().contains("503"));
    }
}
