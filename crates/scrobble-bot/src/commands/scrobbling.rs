//! Scrobbling command - turns scrobbling on or off for a linked account.

use crate::commands::{chat_user, CommandHandler};
use crate::error::AppResult;
use crate::replies::describe_error;
use crate::Users;
use async_trait::async_trait;
use signal_client::BotMessage;
use std::sync::Arc;

const TRIGGER: &str = "!scrobbling";
const USAGE: &str = "Usage: !scrobbling on | !scrobbling off";

pub struct ScrobblingHandler {
    users: Arc<Users>,
}

impl ScrobblingHandler {
    pub fn new(users: Arc<Users>) -> Self {
        Self { users }
    }
}

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_lowercase().as_str() {
        "on" | "enable" | "start" => Some(true),
        "off" | "disable" | "stop" => Some(false),
        _ => None,
    }
}

fn state(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[async_trait]
impl CommandHandler for ScrobblingHandler {
    fn name(&self) -> &str {
        "scrobbling"
    }

    fn trigger(&self) -> Option<&str> {
        Some(TRIGGER)
    }

    async fn execute(&self, message: &BotMessage) -> AppResult<String> {
        let user = chat_user(message);

        let Some(arg) = message.argument(TRIGGER) else {
            return Ok(match self.users.get_registered_user(&user).await {
                Ok(registered) => format!(
                    "Scrobbling is {}. {}",
                    state(registered.scrobbling_enabled),
                    USAGE
                ),
                Err(e) => describe_error(&e),
            });
        };

        let Some(enabled) = parse_switch(arg) else {
            return Ok(USAGE.into());
        };

        match self.users.toggle_scrobbling_for_user(&user, enabled).await {
            Ok(previous) if previous == enabled => {
                Ok(format!("Scrobbling was already {}.", state(enabled)))
            }
            Ok(_) => Ok(format!("Scrobbling is now {}.", state(enabled))),
            Err(e) => Ok(describe_error(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("on"), Some(true));
        assert_eq!(parse_switch("OFF"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }
}
