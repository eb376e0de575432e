//! Last.fm HTTP client.

use crate::error::LastfmError;
use crate::params::RequestParams;
use crate::signature::{compute_signature, FORMAT_PARAM};
use crate::types::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

const USER_AGENT: &str = concat!("scrobble-bot/", env!("CARGO_PKG_VERSION"));

/// Last.fm API client.
///
/// Both the API key and the shared secret are stored as `SecretString`;
/// the secret never leaves this process except folded into `api_sig`.
#[derive(Clone)]
pub struct LastfmClient {
    client: Client,
    base_url: String,
    auth_url: String,
    api_key: SecretString,
    shared_secret: SecretString,
}

impl LastfmClient {
    /// Create a new Last.fm client.
    pub fn new(
        api_key: impl Into<String>,
        shared_secret: impl Into<String>,
        base_url: impl Into<String>,
        auth_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LastfmError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            auth_url: auth_url.into(),
            api_key: SecretString::new(api_key.into()),
            shared_secret: SecretString::new(shared_secret.into()),
        })
    }

    /// Fetch an unauthenticated one-time request token (`auth.gettoken`).
    #[instrument(skip(self))]
    pub async fn fetch_request_token(&self) -> Result<String, LastfmError> {
        let params = RequestParams::for_method("auth.gettoken");

        let body = self
            .perform_request(params, RequestMethod::Get, true)
            .await
            .map_err(|e| match e {
                // Only unavailability is meaningful for token requests.
                LastfmError::ServiceUnavailable => LastfmError::ServiceUnavailable,
                other => LastfmError::UnknownRequestError(other.to_string()),
            })?;

        let response: TokenResponse = decode(body)?;
        debug!("Obtained request token");
        Ok(response.token)
    }

    /// URL a user must visit to grant this application access to their account.
    pub fn authorization_url(&self, token: &str) -> String {
        format!(
            "{}?api_key={}&token={}",
            self.auth_url,
            encode(self.api_key.expose_secret()),
            encode(token)
        )
    }

    /// Exchange an authorized request token for a session (`auth.getsession`).
    #[instrument(skip(self, token))]
    pub async fn get_session(&self, token: &str) -> Result<LastfmSession, LastfmError> {
        let mut params = RequestParams::for_method("auth.getsession");
        params.set("token", token);

        let body = self
            .perform_request(params, RequestMethod::Get, true)
            .await
            .map_err(|e| match e {
                LastfmError::ServiceUnavailable => LastfmError::ServiceUnavailable,
                LastfmError::TokenNotAuthorized => LastfmError::TokenNotAuthorized,
                other => LastfmError::UnknownRequestError(other.to_string()),
            })?;

        let response: SessionResponse = decode(body)?;
        debug!(user = %response.session.name, "Session established");

        Ok(LastfmSession {
            session_key: SecretString::new(response.session.key),
            user_name: response.session.name,
        })
    }

    /// Submit a batch of plays (`track.scrobble`).
    ///
    /// Entries are indexed positionally (`artist[i]`, `track[i]`,
    /// `timestamp[i]`, optional `album[i]`). An empty batch sends nothing;
    /// more than [`MAX_SCROBBLES_PER_REQUEST`] fails with
    /// [`LastfmError::BatchTooLarge`] before any I/O.
    #[instrument(skip(self, scrobbles, session_key), fields(count = scrobbles.len()))]
    pub async fn scrobble(
        &self,
        scrobbles: &[Scrobble],
        session_key: &str,
    ) -> Result<(), LastfmError> {
        if scrobbles.is_empty() {
            return Ok(());
        }

        if scrobbles.len() > MAX_SCROBBLES_PER_REQUEST {
            return Err(LastfmError::BatchTooLarge {
                size: scrobbles.len(),
                max: MAX_SCROBBLES_PER_REQUEST,
            });
        }

        let params = scrobble_params(scrobbles, session_key);
        self.perform_request(params, RequestMethod::Post, true).await?;

        debug!("Scrobbled {} tracks", scrobbles.len());
        Ok(())
    }

    /// Health check - returns true if the API host answers at all.
    pub async fn health_check(&self) -> bool {
        self.client.get(&self.base_url).send().await.is_ok()
    }

    /// Sign (optionally) and dispatch a request, returning the decoded JSON body.
    ///
    /// `api_key` is always added, `api_sig` is added before `format` for
    /// signed calls. A signed POST without `sk` is rejected before any I/O.
    pub async fn perform_request(
        &self,
        mut params: RequestParams,
        method: RequestMethod,
        signed: bool,
    ) -> Result<serde_json::Value, LastfmError> {
        params.set("api_key", self.api_key.expose_secret().as_str());

        if signed {
            if method == RequestMethod::Post && !params.contains_key("sk") {
                return Err(LastfmError::SessionKeyNotProvidedOnRequest);
            }
            let signature = compute_signature(&params, self.shared_secret.expose_secret());
            params.set("api_sig", signature);
        }

        params.set(FORMAT_PARAM, "json");

        let request = match method {
            RequestMethod::Get => self.client.get(&self.base_url).query(params.as_pairs()),
            RequestMethod::Post => self.client.post(&self.base_url).form(params.as_pairs()),
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&text) {
            return Err(classify_api_error(&api_error));
        }

        if !status.is_success() {
            warn!(status = %status, "Last.fm request failed");
            let snippet: String = text.chars().take(200).collect();
            return Err(LastfmError::UnknownRequestError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| LastfmError::UnknownRequestError(format!("invalid response body: {}", e)))
    }
}

/// Build the positional `track.scrobble` parameter set.
pub fn scrobble_params(scrobbles: &[Scrobble], session_key: &str) -> RequestParams {
    let mut params = RequestParams::for_method("track.scrobble");

    for (i, scrobble) in scrobbles.iter().enumerate() {
        params.set(format!("artist[{}]", i), scrobble.artist.as_str());
        params.set(format!("track[{}]", i), scrobble.track.as_str());
        params.set(format!("timestamp[{}]", i), scrobble.timestamp.to_string());
        if let Some(album) = scrobble.album.as_deref().filter(|a| !a.is_empty()) {
            params.set(format!("album[{}]", i), album);
        }
    }

    params.set("sk", session_key);
    params
}

fn classify_api_error(api_error: &ApiErrorResponse) -> LastfmError {
    warn!(code = api_error.error, message = %api_error.message, "Last.fm API error");

    match api_error.error {
        error_code::SERVICE_OFFLINE | error_code::TEMPORARILY_UNAVAILABLE => {
            LastfmError::ServiceUnavailable
        }
        error_code::TOKEN_NOT_AUTHORIZED => LastfmError::TokenNotAuthorized,
        error_code::INVALID_SESSION_KEY => LastfmError::SessionExpired,
        code => LastfmError::UnknownRequestError(format!("error {}: {}", code, api_error.message)),
    }
}

fn transport_error(e: reqwest::Error) -> LastfmError {
    if e.is_timeout() {
        warn!("Last.fm request timed out");
        LastfmError::ServiceUnavailable
    } else {
        LastfmError::UnknownRequestError(e.to_string())
    }
}

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, LastfmError> {
    serde_json::from_value(body)
        .map_err(|e| LastfmError::UnknownRequestError(format!("unexpected response shape: {}", e)))
}
