//! Signal bot that links chat users to Last.fm accounts and relays scrobbles.

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod follow_up;
pub mod replies;

use lastfm_client::LastfmClient;
use user_registry::UsersService;

/// The registry as wired in production.
pub type Users = UsersService<LastfmClient>;
