//! Unregister command - forgets a linked Last.fm account.

use crate::commands::{chat_user, CommandHandler};
use crate::error::AppResult;
use crate::replies::describe_error;
use crate::Users;
use async_trait::async_trait;
use signal_client::BotMessage;
use std::sync::Arc;
use tracing::info;

pub struct UnregisterHandler {
    users: Arc<Users>,
}

impl UnregisterHandler {
    pub fn new(users: Arc<Users>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CommandHandler for UnregisterHandler {
    fn name(&self) -> &str {
        "unregister"
    }

    fn trigger(&self) -> Option<&str> {
        Some("!unregister")
    }

    async fn execute(&self, message: &BotMessage) -> AppResult<String> {
        let user = chat_user(message);

        match self.users.unregister_user(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "User unregistered");
                Ok("Your Last.fm account has been unlinked.".into())
            }
            Err(e) => Ok(describe_error(&e)),
        }
    }
}
