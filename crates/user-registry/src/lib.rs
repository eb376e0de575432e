//! Last.fm account linking for chat users.
//!
//! Holds the in-memory record of users who are mid-handshake and users who
//! have linked an account, and drives the token / authorize / session
//! exchange through a [`ScrobblingApi`]. Nothing is persisted; state lives
//! for the lifetime of the process.

mod api;
mod error;
mod locks;
mod service;
mod store;
mod types;

pub use api::ScrobblingApi;
pub use error::{RegistryError, RegistryResult};
pub use locks::{UserGuard, UserLocks};
pub use service::UsersService;
pub use store::UserStore;
pub use types::*;
