//! Request and response types for the Last.fm API.

use secrecy::SecretString;
use serde::Deserialize;

/// Largest batch `track.scrobble` accepts in a single request.
pub const MAX_SCROBBLES_PER_REQUEST: usize = 50;

/// Numeric error codes reported by the Last.fm API.
pub mod error_code {
    pub const INVALID_SESSION_KEY: u32 = 9;
    pub const SERVICE_OFFLINE: u32 = 11;
    pub const TOKEN_NOT_AUTHORIZED: u32 = 14;
    pub const TEMPORARILY_UNAVAILABLE: u32 = 16;
}

/// HTTP verb used for an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// A durable session obtained by exchanging an authorized request token.
#[derive(Debug, Clone)]
pub struct LastfmSession {
    pub session_key: SecretString,
    pub user_name: String,
}

/// One play record submitted through `track.scrobble`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrobble {
    pub artist: String,
    pub track: String,
    pub album: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

/// `auth.gettoken` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `auth.getsession` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub session: SessionBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionBody {
    pub name: String,
    pub key: String,
}

/// Error payload; Last.fm sends it with both 2xx and 4xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: u32,
    #[serde(default)]
    pub message: String,
}
