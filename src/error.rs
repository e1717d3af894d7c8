//! Error types for jira-beads-sync
//!
//! Covers every failure mode of a sync run. Per-issue store failures are
//! counted by the reconciler rather than propagated; everything that reaches
//! `main` through this type is fatal for the run.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP errors
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Parsing errors (responses that are not the expected shape)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Integration errors (JIRA responses the adapter cannot use)
    #[error("Integration error: {0}")]
    Integration(String),

    /// Local beads store errors
    #[error("Beads error: {0}")]
    Store(#[from] beads::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Whether the error came from reaching (or authenticating against) the
    /// external tracker, as opposed to a local problem.
    pub fn is_source_unavailable(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::Auth(_) | SyncError::Integration(_) => true,
            SyncError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_status(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SyncError::Config("missing url".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing url");

        let err = SyncError::from(beads::Error::NotInstalled);
        assert_eq!(err.to_string(), "Beads error: bd is not installed or not in PATH");
    }

    #[test]
    fn test_source_unavailable_classification() {
        assert!(SyncError::Network("refused".to_string()).is_source_unavailable());
        assert!(SyncError::Auth("401".to_string()).is_source_unavailable());
        assert!(!SyncError::Config("bad".to_string()).is_source_unavailable());
        assert!(!SyncError::Parse("not json".to_string()).is_source_unavailable());
        assert!(!SyncError::from(beads::Error::NotInRepo).is_source_unavailable());
    }
}
