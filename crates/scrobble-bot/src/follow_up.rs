//! Follow-up collection for users in the middle of registering.
//!
//! After `!register` the bot waits for the user to reply "done" (or
//! "cancel"). The router diverts that user's plain-text direct messages
//! to a per-user channel drained by [`run_registration_follow_up`].

use crate::replies::describe_error;
use crate::Users;
use signal_client::{BotMessage, SignalClient};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use user_registry::{ChatUser, FollowUpCollector};

const CHANNEL_CAPACITY: usize = 8;

struct Route {
    id: u64,
    sender: mpsc::Sender<BotMessage>,
}

/// Routes plain-text messages from collecting users to their collector.
#[derive(Clone, Default)]
pub struct FollowUpRouter {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    next_id: Arc<AtomicU64>,
}

impl FollowUpRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting a user's messages, replacing any earlier collector.
    pub fn open(&self, user_id: &str) -> (FollowUpHandle, mpsc::Receiver<BotMessage>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.routes()
            .insert(user_id.to_string(), Route { id, sender });

        let handle = FollowUpHandle {
            router: self.clone(),
            user_id: user_id.to_string(),
            id,
        };
        (handle, receiver)
    }

    /// Hand a message to its sender's collector.
    ///
    /// Only direct messages are diverted, and never commands (`!...`).
    /// Returns true if the message was consumed.
    pub fn route(&self, message: &BotMessage) -> bool {
        if message.is_group || message.text.starts_with('!') {
            return false;
        }

        let routes = self.routes();
        match routes.get(&message.source) {
            Some(route) => match route.sender.try_send(message.clone()) {
                Ok(()) => true,
                Err(e) => {
                    warn!(source = %message.source, "Dropping follow-up: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    pub fn is_collecting(&self, user_id: &str) -> bool {
        self.routes().contains_key(user_id)
    }

    fn close(&self, user_id: &str, id: u64) {
        let mut routes = self.routes();
        if routes.get(user_id).map(|r| r.id == id).unwrap_or(false) {
            routes.remove(user_id);
            debug!(user_id = %user_id, "Follow-up collector closed");
        }
    }

    fn routes(&self) -> MutexGuard<'_, HashMap<String, Route>> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Stops one collector; a newer collector for the same user is unaffected.
#[derive(Clone)]
pub struct FollowUpHandle {
    router: FollowUpRouter,
    user_id: String,
    id: u64,
}

impl FollowUpCollector for FollowUpHandle {
    fn stop(&self) {
        self.router.close(&self.user_id, self.id);
    }
}

/// What the user meant by a follow-up message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowUp {
    Done,
    Cancel,
    Other,
}

fn parse_follow_up(text: &str) -> FollowUp {
    match text.trim().trim_end_matches(['.', '!']).to_lowercase().as_str() {
        "done" => FollowUp::Done,
        "cancel" => FollowUp::Cancel,
        _ => FollowUp::Other,
    }
}

/// Wait for the user to confirm or abandon the handshake.
///
/// Ends when the user answers, when the registration is cancelled
/// elsewhere (the route closes), or after `timeout` of silence, which
/// cancels the registration.
pub async fn run_registration_follow_up(
    users: Arc<Users>,
    signal: SignalClient,
    user: ChatUser,
    origin: BotMessage,
    handle: FollowUpHandle,
    mut receiver: mpsc::Receiver<BotMessage>,
    timeout: Duration,
) {
    loop {
        let message = match tokio::time::timeout(timeout, receiver.recv()).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(user_id = %user.id, "Follow-up stopped");
                break;
            }
            Err(_) => {
                info!(user_id = %user.id, "Registration timed out");
                users.cancel_registration_process(&user).await;
                if let Err(e) = signal
                    .reply_privately(
                        &origin,
                        "Registration timed out. Send !register to start again.",
                    )
                    .await
                {
                    warn!("Failed to send timeout notice: {}", e);
                }
                break;
            }
        };

        match parse_follow_up(&message.text) {
            FollowUp::Done => {
                let reply = match users.complete_registration_process(&user).await {
                    Ok(registered) => format!(
                        "Linked to Last.fm user {}. Scrobbling is on; use !scrobbling off to pause it.",
                        registered.external_user_name
                    ),
                    Err(e) => describe_error(&e),
                };
                handle.stop();
                send(&signal, &message, &reply).await;
                break;
            }
            FollowUp::Cancel => {
                users.cancel_registration_process(&user).await;
                handle.stop();
                send(&signal, &message, "Registration cancelled.").await;
                break;
            }
            FollowUp::Other => {
                send(
                    &signal,
                    &message,
                    "Reply \"done\" once you've authorized the bot on Last.fm, or \"cancel\" to stop.",
                )
                .await;
            }
        }
    }
}

async fn send(signal: &SignalClient, to: &BotMessage, text: &str) {
    if let Err(e) = signal.reply(to, text).await {
        warn!("Failed to send follow-up reply: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(source: &str, text: &str) -> BotMessage {
        BotMessage {
            source: source.into(),
            source_name: None,
            text: text.into(),
            timestamp: 0,
            is_group: false,
            group_id: None,
            receiving_account: "+15555555555".into(),
        }
    }

    #[test]
    fn test_parse_follow_up() {
        assert_eq!(parse_follow_up("done"), FollowUp::Done);
        assert_eq!(parse_follow_up("  Done! "), FollowUp::Done);
        assert_eq!(parse_follow_up("CANCEL"), FollowUp::Cancel);
        assert_eq!(parse_follow_up("what?"), FollowUp::Other);
        assert_eq!(parse_follow_up("ok"), FollowUp::Other);
        assert_eq!(parse_follow_up("yes"), FollowUp::Other);
        assert_eq!(parse_follow_up("no"), FollowUp::Other);
        assert_eq!(parse_follow_up("stop"), FollowUp::Other);
    }

    #[tokio::test]
    async fn test_route_delivers_to_collector() {
        let router = FollowUpRouter::new();
        let (_handle, mut receiver) = router.open("alice");

        assert!(router.route(&message("alice", "done")));
        assert!(!router.route(&message("bob", "done")));
        assert_eq!(receiver.recv().await.unwrap().text, "done");
    }

    #[tokio::test]
    async fn test_group_messages_are_not_routed() {
        let router = FollowUpRouter::new();
        let (_handle, mut receiver) = router.open("alice");

        let mut chatter = message("alice", "done");
        chatter.is_group = true;
        chatter.group_id = Some("group-1".into());

        assert!(!router.route(&chatter));
        assert!(router.is_collecting("alice"));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_commands_are_not_routed() {
        let router = FollowUpRouter::new();
        let (_handle, _receiver) = router.open("alice");

        assert!(!router.route(&message("alice", "!cancel")));
    }

    #[tokio::test]
    async fn test_stop_closes_channel() {
        let router = FollowUpRouter::new();
        let (handle, mut receiver) = router.open("alice");

        handle.stop();

        assert!(!router.is_collecting("alice"));
        assert!(!router.route(&message("alice", "done")));
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_handle_keeps_newer_route() {
        let router = FollowUpRouter::new();
        let (old, _old_receiver) = router.open("alice");
        let (_new, _new_receiver) = router.open("alice");

        old.stop();
        assert!(router.is_collecting("alice"));
    }
}
