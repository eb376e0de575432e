//! Chat identities, registration records and playback values.

use chrono::{DateTime, Utc};
use lastfm_client::Scrobble;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A chat-platform user as seen by the command layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatUser {
    pub id: String,
    pub display_name: String,
}

impl ChatUser {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Handle to a follow-up message listener owned by the command layer.
///
/// The registry only keeps it so that cancelling a registration can stop it.
pub trait FollowUpCollector: Send + Sync {
    fn stop(&self);
}

/// A user midway through the authorization handshake.
#[derive(Clone)]
pub struct RegisteringUser {
    pub chat_user_id: String,
    pub chat_user_display_name: String,
    pub pending_request_token: String,
    pub follow_up_collector: Option<Arc<dyn FollowUpCollector>>,
}

impl RegisteringUser {
    pub fn new(user: &ChatUser, pending_request_token: impl Into<String>) -> Self {
        Self {
            chat_user_id: user.id.clone(),
            chat_user_display_name: user.display_name.clone(),
            pending_request_token: pending_request_token.into(),
            follow_up_collector: None,
        }
    }
}

impl fmt::Debug for RegisteringUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteringUser")
            .field("chat_user_id", &self.chat_user_id)
            .field("chat_user_display_name", &self.chat_user_display_name)
            .field("has_follow_up_collector", &self.follow_up_collector.is_some())
            .finish_non_exhaustive()
    }
}

/// A chat user linked to a Last.fm account.
///
/// Values handed out by the registry are copies; mutating one does not
/// touch the stored record.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub chat_user_id: String,
    pub chat_user_display_name: String,
    pub external_user_name: String,
    pub external_session_key: SecretString,
    pub scrobbling_enabled: bool,
}

/// A played track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub artist: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
}

impl Track {
    pub fn new(artist: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            name: name.into(),
            album: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// When a track was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackData {
    pub timestamp: DateTime<Utc>,
}

impl PlaybackData {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }
}

/// Pair a track with its playback, truncating the time to whole seconds.
pub fn to_scrobble(track: &Track, playback: &PlaybackData) -> Scrobble {
    Scrobble {
        artist: track.artist.clone(),
        track: track.name.clone(),
        album: track.album.clone(),
        timestamp: playback.timestamp.timestamp(),
    }
}

/// Result of a per-user scrobble request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrobbleOutcome {
    /// Plays were submitted to Last.fm.
    Submitted(usize),
    /// The user switched scrobbling off; nothing was sent.
    Disabled,
}
