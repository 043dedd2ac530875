//! Shared types used across sitewatch modules
//!
//! Contains the per-visit result structure and its status classification.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Terminal classification of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    /// The visit navigated, settled and finished without an aborting error
    Success,
    /// The visit was aborted by launch, HTTP or navigation failure
    Error,
}

/// Outcome of one end-to-end visit against one device profile.
///
/// Created fresh per visit, folded into the run counters and logged;
/// only the screenshot file and log lines outlive it.
#[derive(Debug, Clone)]
pub struct VisitResult {
    /// Whether the visit succeeded or was aborted
    pub status: VisitStatus,
    /// Error message for aborted visits
    pub error: Option<String>,
    /// Worst HTTP status observed (0 if no error status was seen)
    pub http_status: i64,
    /// Whether a screenshot file was written
    pub screenshot_taken: bool,
    /// Path of the screenshot, when one was written
    pub screenshot_path: Option<PathBuf>,
}

impl VisitResult {
    /// Create a successful result
    pub fn success() -> Self {
        Self {
            status: VisitStatus::Success,
            error: None,
            http_status: 0,
            screenshot_taken: false,
            screenshot_path: None,
        }
    }

    /// Create an aborted result carrying the error message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: VisitStatus::Error,
            error: Some(message.into()),
            http_status: 0,
            screenshot_taken: false,
            screenshot_path: None,
        }
    }

    /// Attach the observed HTTP status
    pub fn with_http_status(mut self, status: i64) -> Self {
        self.http_status = status;
        self
    }

    /// Record a written screenshot
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot_taken = true;
        self.screenshot_path = Some(path);
        self
    }

    /// True when the visit finished without an aborting error
    pub fn is_success(&self) -> bool {
        self.status == VisitStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result() {
        let result = VisitResult::success();
        assert!(result.is_success());
        assert_eq!(result.http_status, 0);
        assert!(!result.screenshot_taken);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_error_result_keeps_message() {
        let result = VisitResult::error("page returned HTTP 404").with_http_status(404);
        assert!(!result.is_success());
        assert_eq!(result.http_status, 404);
        assert_eq!(result.error.as_deref(), Some("page returned HTTP 404"));
    }

    #[test]
    fn test_with_screenshot_marks_taken() {
        let result = VisitResult::success().with_screenshot(PathBuf::from("screenshots/a.png"));
        assert!(result.screenshot_taken);
        assert_eq!(
            result.screenshot_path.as_deref(),
            Some(std::path::Path::new("screenshots/a.png"))
        );
    }
}
