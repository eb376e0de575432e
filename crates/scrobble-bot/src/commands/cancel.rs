//! Cancel command - abandons a pending registration.

use crate::commands::{chat_user, CommandHandler};
use crate::error::AppResult;
use crate::Users;
use async_trait::async_trait;
use signal_client::BotMessage;
use std::sync::Arc;

pub struct CancelHandler {
    users: Arc<Users>,
}

impl CancelHandler {
    pub fn new(users: Arc<Users>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CommandHandler for CancelHandler {
    fn name(&self) -> &str {
        "cancel"
    }

    fn trigger(&self) -> Option<&str> {
        Some("!cancel")
    }

    async fn execute(&self, message: &BotMessage) -> AppResult<String> {
        let user = chat_user(message);

        if !self.users.is_user_in_registration_process(&user).await {
            return Ok("You have no registration in progress.".into());
        }

        self.users.cancel_registration_process(&user).await;
        Ok("Registration cancelled.".into())
    }
}
