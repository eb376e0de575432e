//! Scrobbling service seam used by the registry.

use async_trait::async_trait;
use lastfm_client::{LastfmClient, LastfmError, LastfmSession, Scrobble};

/// The subset of the Last.fm API the registry depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScrobblingApi: Send + Sync {
    /// Obtain an unauthorized request token.
    async fn fetch_request_token(&self) -> Result<String, LastfmError>;

    /// Web URL where the user approves the token.
    fn authorization_url(&self, token: &str) -> String;

    /// Exchange an approved token for a session.
    async fn get_session(&self, token: String) -> Result<LastfmSession, LastfmError>;

    /// Submit one batch of plays.
    async fn scrobble(
        &self,
        scrobbles: Vec<Scrobble>,
        session_key: String,
    ) -> Result<(), LastfmError>;
}

#[async_trait]
impl ScrobblingApi for LastfmClient {
    async fn fetch_request_token(&self) -> Result<String, LastfmError> {
        LastfmClient::fetch_request_token(self).await
    }

    fn authorization_url(&self, token: &str) -> String {
        LastfmClient::authorization_url(self, token)
    }

    async fn get_session(&self, token: String) -> Result<LastfmSession, LastfmError> {
        LastfmClient::get_session(self, &token).await
    }

    async fn scrobble(
        &self,
        scrobbles: Vec<Scrobble>,
        session_key: String,
    ) -> Result<(), LastfmError> {
        LastfmClient::scrobble(self, &scrobbles, &session_key).await
    }
}
