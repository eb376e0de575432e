//! Message dispatch: follow-ups first, then commands.

use crate::commands::*;
use crate::follow_up::FollowUpRouter;
use crate::Users;
use signal_client::{BotMessage, SignalClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub struct Bot {
    signal: SignalClient,
    router: FollowUpRouter,
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl Bot {
    pub fn new(users: Arc<Users>, signal: SignalClient, follow_up_timeout: Duration) -> Self {
        let router = FollowUpRouter::new();

        let handlers: Vec<Box<dyn CommandHandler>> = vec![
            Box::new(RegisterHandler::new(
                users.clone(),
                signal.clone(),
                router.clone(),
                follow_up_timeout,
            )),
            Box::new(CancelHandler::new(users.clone())),
            Box::new(StatusHandler::new(users.clone())),
            Box::new(ScrobbleHandler::new(users.clone())),
            Box::new(ScrobblingHandler::new(users.clone())),
            Box::new(UnregisterHandler::new(users)),
            Box::new(HelpHandler::new()),
        ];

        Self {
            signal,
            router,
            handlers,
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Handle one incoming message, replying in its conversation.
    pub async fn handle(&self, message: &BotMessage) {
        if self.router.route(message) {
            return;
        }

        let Some(handler) = self.handlers.iter().find(|h| h.matches(message)) else {
            return;
        };

        debug!(command = handler.name(), "Dispatching");

        match handler.execute(message).await {
            Ok(response) => {
                if let Err(e) = self.signal.reply(message, &response).await {
                    error!("Failed to send reply: {}", e);
                }
            }
            Err(e) => {
                error!(command = handler.name(), "Handler error: {}", e);
                let _ = self
                    .signal
                    .reply(message, "Sorry, something went wrong.")
                    .await;
            }
        }
    }
}
