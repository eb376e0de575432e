//! Registry errors.

use lastfm_client::LastfmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("User is already registered")]
    UserAlreadyRegistered,

    #[error("User is already in the registration process")]
    UserAlreadyInRegistrationProcess,

    #[error("User is not in the registration process")]
    UserNotInRegistrationProcess,

    #[error("User is not registered")]
    UserNotRegistered,

    #[error("Got {tracks} tracks but {playbacks} playback records")]
    MismatchedScrobbleData { tracks: usize, playbacks: usize },

    #[error(transparent)]
    Lastfm(#[from] LastfmError),
}

impl RegistryError {
    /// The Last.fm outcome behind this error, if it came from the network.
    pub fn as_lastfm(&self) -> Option<&LastfmError> {
        match self {
            RegistryError::Lastfm(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
