//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Signal error: {0}")]
    Signal(#[from] signal_client::SignalError),

    #[error("Last.fm error: {0}")]
    Lastfm(#[from] lastfm_client::LastfmError),

    #[error("Registry error: {0}")]
    Registry(#[from] user_registry::RegistryError),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
