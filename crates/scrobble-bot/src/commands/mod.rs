//! Bot command handlers.

mod cancel;
mod help;
mod register;
mod scrobble;
mod scrobbling;
mod status;
mod unregister;

pub use cancel::CancelHandler;
pub use help::HelpHandler;
pub use register::RegisterHandler;
pub use scrobble::ScrobbleHandler;
pub use scrobbling::ScrobblingHandler;
pub use status::StatusHandler;
pub use unregister::UnregisterHandler;

use crate::error::AppResult;
use async_trait::async_trait;
use signal_client::BotMessage;
use user_registry::ChatUser;

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name (e.g., "help", "register").
    fn name(&self) -> &str;

    /// Command trigger (e.g., "!help").
    fn trigger(&self) -> Option<&str> {
        None
    }

    /// Whether this is the default handler for non-command messages.
    fn is_default(&self) -> bool {
        false
    }

    /// Check if this handler matches the message.
    fn matches(&self, message: &BotMessage) -> bool {
        if let Some(trigger) = self.trigger() {
            message.is_command(trigger)
        } else {
            self.is_default() && !message.text.starts_with('!')
        }
    }

    /// Execute the command.
    async fn execute(&self, message: &BotMessage) -> AppResult<String>;
}

/// The chat user who sent a message.
pub fn chat_user(message: &BotMessage) -> ChatUser {
    ChatUser::new(message.source.clone(), message.display_name())
}
