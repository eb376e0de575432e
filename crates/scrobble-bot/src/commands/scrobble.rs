//! Scrobble command - records a play on the sender's Last.fm profile.

use crate::commands::{chat_user, CommandHandler};
use crate::error::AppResult;
use crate::replies::describe_error;
use crate::Users;
use async_trait::async_trait;
use chrono::DateTime;
use signal_client::BotMessage;
use std::sync::Arc;
use user_registry::{PlaybackData, ScrobbleOutcome, Track};

const TRIGGER: &str = "!scrobble";
const USAGE: &str = "Usage: !scrobble Artist - Track [- Album]";

pub struct ScrobbleHandler {
    users: Arc<Users>,
}

impl ScrobbleHandler {
    pub fn new(users: Arc<Users>) -> Self {
        Self { users }
    }
}

/// Parse `Artist - Track` with an optional trailing ` - Album`.
fn parse_track(text: &str) -> Option<Track> {
    let mut parts = text.splitn(3, " - ").map(str::trim);
    let artist = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;

    let track = Track::new(artist, name);
    Some(match parts.next().filter(|s| !s.is_empty()) {
        Some(album) => track.with_album(album),
        None => track,
    })
}

/// When the message was sent, or now if the timestamp is unusable.
fn played_at(message: &BotMessage) -> PlaybackData {
    DateTime::from_timestamp_millis(message.timestamp)
        .filter(|_| message.timestamp > 0)
        .map(PlaybackData::new)
        .unwrap_or_else(PlaybackData::now)
}

#[async_trait]
impl CommandHandler for ScrobbleHandler {
    fn name(&self) -> &str {
        "scrobble"
    }

    fn trigger(&self) -> Option<&str> {
        Some(TRIGGER)
    }

    async fn execute(&self, message: &BotMessage) -> AppResult<String> {
        let Some(track) = message.argument(TRIGGER).and_then(parse_track) else {
            return Ok(USAGE.into());
        };

        let user = chat_user(message);
        let outcome = self
            .users
            .scrobble_for_user(&user, std::slice::from_ref(&track), &[played_at(message)])
            .await;

        Ok(match outcome {
            Ok(ScrobbleOutcome::Submitted(_)) => {
                format!("Scrobbled {} - {}.", track.artist, track.name)
            }
            Ok(ScrobbleOutcome::Disabled) => {
                "Scrobbling is off. Send !scrobbling on to turn it back on.".into()
            }
            Err(e) => describe_error(&e),
        })
    }
}
