//! Error taxonomy for event construction and delivery.

use thiserror::Error;

/// Errors that abort a tracker run.
///
/// Defaulting gaps (empty title or message) and a missing pull request are
/// not errors and never show up here.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Transport-level failure talking to the tracker or GitHub
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Tracker answered with a non-2xx status
    #[error("tracker rejected event with status {status}: {body}")]
    TrackerStatus { status: u16, body: String },

    /// Tracker answered 2xx but the body lacks `event.metadata.id`
    #[error("malformed tracker response: {0}")]
    MalformedResponse(String),

    /// GitHub pull request listing failed
    #[error("GitHub API returned status {status}: {body}")]
    GithubApi { status: u16, body: String },

    /// Repository slug is not `owner/name`
    #[error("invalid repository: {0}")]
    InvalidRepository(String),

    /// Required run context variable is not set
    #[error("missing run context: {0}")]
    MissingContext(String),

    /// Token or user agent cannot be used as a header value
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// JSON encoding or decoding error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (GITHUB_OUTPUT file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_status_display() {
        let err = TrackerError::TrackerStatus {
            status: 500,
            body: "internal error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("internal error"));
    }

    #[test]
    fn test_missing_context_display() {
        let err = TrackerError::MissingContext("GITHUB_SHA".to_string());
        assert_eq!(err.to_string(), "missing run context: GITHUB_SHA");
    }

    #[test]
    fn test_serialization_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TrackerError = json_err.into();
        assert!(matches!(err, TrackerError::Serialization(_)));
    }
}
