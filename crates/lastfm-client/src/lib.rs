//! Last.fm API client with signed requests.

mod client;
mod error;
mod params;
mod signature;
mod types;

pub use client::{scrobble_params, LastfmClient};
pub use error::LastfmError;
pub use params::RequestParams;
pub use signature::{compute_signature, FORMAT_PARAM};
pub use types::*;

/// Production endpoints.
pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_AUTH_URL: &str = "https://www.last.fm/api/auth/";
