//! Last.fm client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LastfmError {
    #[error("Last.fm is temporarily unavailable")]
    ServiceUnavailable,

    #[error("Request token has not been authorized by the user")]
    TokenNotAuthorized,

    #[error("Session key is invalid or access was revoked")]
    SessionExpired,

    #[error("Signed POST requests must carry a session key")]
    SessionKeyNotProvidedOnRequest,

    #[error("At most {max} scrobbles per request, got {size}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Last.fm request failed: {0}")]
    UnknownRequestError(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl LastfmError {
    /// Whether the caller may reasonably retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(self, LastfmError::ServiceUnavailable)
    }
}
