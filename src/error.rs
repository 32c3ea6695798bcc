use thiserror::Error;

/// Failure talking to the platform. Every variant is recoverable for the tracker
/// except when it happens during the initial connect.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Submission not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        PlatformError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for PlatformError {
    fn from(err: url::ParseError) -> Self {
        PlatformError::Parse(err.to_string())
    }
}

/// Errors that stop the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Unable to connect to {platform}: {source}")]
    Connect {
        platform: &'static str,
        #[source]
        source: PlatformError,
    },
}
