//! Help command - displays available commands.

use crate::commands::CommandHandler;
use crate::error::AppResult;
use async_trait::async_trait;
use signal_client::BotMessage;

pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    fn trigger(&self) -> Option<&str> {
        Some("!help")
    }

    async fn execute(&self, _message: &BotMessage) -> AppResult<String> {
        Ok(r#"**Scrobble Bot**

Link your Last.fm account and I'll scrobble the tracks you tell me about.

**Commands:**
- !register - Link your Last.fm account
- !cancel - Abandon a registration in progress
- !status - Show your linked account
- !scrobble Artist - Track [- Album] - Record a play
- !scrobbling on|off - Pause or resume scrobbling
- !unregister - Unlink your Last.fm account
- !help - Show this message

**Linking:**
After !register I'll send you a Last.fm link. Allow access there, then reply "done".

**Privacy:**
Only your Last.fm user name and session key are kept, in memory. Nothing survives a restart."#
            .into())
    }
}
