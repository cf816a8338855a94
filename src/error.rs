use thiserror::Error;

/// Errors produced by the session and synchronization core.
///
/// Variants carry rendered messages rather than source errors so the type can be
/// cloned; a coalesced token refresh hands the same outcome to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not logged in")]
    Unauthenticated,
    #[error("network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("session changed while the request was in flight")]
    StaleSession,
}

impl SyncError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth(_) | SyncError::Unauthenticated)
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
