//! Status command - shows what the bot knows about the sender.

use crate::commands::{chat_user, CommandHandler};
use crate::error::AppResult;
use crate::Users;
use async_trait::async_trait;
use signal_client::BotMessage;
use std::sync::Arc;

pub struct StatusHandler {
    users: Arc<Users>,
}

impl StatusHandler {
    pub fn new(users: Arc<Users>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CommandHandler for StatusHandler {
    fn name(&self) -> &str {
        "status"
    }

    fn trigger(&self) -> Option<&str> {
        Some("!status")
    }

    async fn execute(&self, message: &BotMessage) -> AppResult<String> {
        let user = chat_user(message);

        if let Ok(registered) = self.users.get_registered_user(&user).await {
            let scrobbling = if registered.scrobbling_enabled { "on" } else { "off" };
            return Ok(format!(
                "Linked to Last.fm user {}. Scrobbling is {}.",
                registered.external_user_name, scrobbling
            ));
        }

        if self.users.is_user_in_registration_process(&user).await {
            return Ok(
                "Registration in progress. Reply \"done\" once you've authorized, or !cancel."
                    .into(),
            );
        }

        Ok("No Last.fm account linked. Send !register to link one.".into())
    }
}
