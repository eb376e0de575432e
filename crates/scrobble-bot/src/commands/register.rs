//! Register command - starts the Last.fm authorization handshake.

use crate::commands::{chat_user, CommandHandler};
use crate::error::AppResult;
use crate::follow_up::{run_registration_follow_up, FollowUpRouter};
use crate::replies::describe_error;
use crate::Users;
use async_trait::async_trait;
use signal_client::{BotMessage, SignalClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct RegisterHandler {
    users: Arc<Users>,
    signal: SignalClient,
    router: FollowUpRouter,
    follow_up_timeout: Duration,
}

impl RegisterHandler {
    pub fn new(
        users: Arc<Users>,
        signal: SignalClient,
        router: FollowUpRouter,
        follow_up_timeout: Duration,
    ) -> Self {
        Self {
            users,
            signal,
            router,
            follow_up_timeout,
        }
    }
}

fn instructions(login_url: &str) -> String {
    format!(
        "Open this link to let me scrobble to your Last.fm account:\n{}\n\n\
         Reply \"done\" here once you've allowed access, or \"cancel\" to stop.",
        login_url
    )
}

#[async_trait]
impl CommandHandler for RegisterHandler {
    fn name(&self) -> &str {
        "register"
    }

    fn trigger(&self) -> Option<&str> {
        Some("!register")
    }

    async fn execute(&self, message: &BotMessage) -> AppResult<String> {
        let user = chat_user(message);

        if let Err(e) = self.users.start_registration_process(&user).await {
            return Ok(describe_error(&e));
        }

        let login_url = match self.users.get_registration_process_login_url(&user).await {
            Ok(url) => url,
            Err(e) => return Ok(describe_error(&e)),
        };

        let (handle, receiver) = self.router.open(&user.id);
        self.users
            .append_collector_on_registration_process(&user, Arc::new(handle.clone()))
            .await;

        tokio::spawn(run_registration_follow_up(
            self.users.clone(),
            self.signal.clone(),
            user.clone(),
            message.clone(),
            handle,
            receiver,
            self.follow_up_timeout,
        ));

        info!(user_id = %user.id, "Registration started");

        if !message.is_group {
            return Ok(instructions(&login_url));
        }

        // Login links are per-user; keep them out of groups.
        if let Err(e) = self
            .signal
            .reply_privately(message, &instructions(&login_url))
            .await
        {
            warn!(user_id = %user.id, "Could not deliver login link");
            self.users.cancel_registration_process(&user).await;
            return Err(e.into());
        }

        Ok(format!(
            "{}, I've sent you a private message with your login link.",
            message.display_name()
        ))
    }
}
