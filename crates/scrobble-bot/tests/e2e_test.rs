//! End-to-end tests: Signal messages in, Last.fm calls and replies out.

mod common;

use common::*;
use std::time::Duration;
use user_registry::ChatUser;

fn alice() -> ChatUser {
    ChatUser::new(USER_NUMBER, "Alice")
}

async fn register(t: &TestBot) {
    t.bot.handle(&direct_message("!register")).await;
    wait_for_message(&t.signal_server, "api_key=test-api-key").await;

    t.bot.handle(&direct_message("done")).await;
    wait_for_message(&t.signal_server, "Linked to Last.fm user").await;
}

#[tokio::test]
async fn test_register_and_confirm() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!register")).await;

    let (to, text) = wait_for_message(&t.signal_server, "last.fm/api/auth").await;
    assert_eq!(to, USER_NUMBER);
    assert!(text.contains("token=request-token"));
    assert!(t.users.is_user_in_registration_process(&alice()).await);

    t.bot.handle(&direct_message("done")).await;

    let (_, text) = wait_for_message(&t.signal_server, "Linked to Last.fm user rj").await;
    assert!(text.contains("Scrobbling is on"));

    let registered = t.users.get_registered_user(&alice()).await.unwrap();
    assert_eq!(registered.external_user_name, LASTFM_USER);
    assert_eq!(registered.chat_user_display_name, "Alice");
    assert!(!t.users.is_user_in_registration_process(&alice()).await);
}

#[tokio::test]
async fn test_register_from_group_sends_link_privately() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&group_message("!register")).await;

    let (to, _) = wait_for_message(&t.signal_server, "token=request-token").await;
    assert_eq!(to, USER_NUMBER);

    let (to, _) = wait_for_message(&t.signal_server, "private message").await;
    assert_eq!(to, "group-1");
}

#[tokio::test]
async fn test_group_chatter_keeps_registration_pending() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&group_message("!register")).await;
    wait_for_message(&t.signal_server, "private message").await;
    let sent_before = sent_messages(&t.signal_server).await.len();

    for chatter in ["ok", "yes", "no", "stop", "done", "cancel"] {
        t.bot.handle(&group_message(chatter)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(t.users.is_user_in_registration_process(&alice()).await);
    assert!(!t.users.is_user_registered(&alice()).await);
    assert_eq!(sent_messages(&t.signal_server).await.len(), sent_before);

    let session_requests = t
        .lastfm_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.query().unwrap_or_default().contains("auth.getsession"))
        .count();
    assert_eq!(session_requests, 0);

    // The handshake still completes from the direct conversation.
    t.bot.handle(&direct_message("done")).await;
    wait_for_message(&t.signal_server, "Linked to Last.fm user rj").await;
}

#[tokio::test]
async fn test_casual_direct_reply_is_not_confirmation() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!register")).await;
    t.bot.handle(&direct_message("ok")).await;

    wait_for_message(&t.signal_server, "authorized the bot on Last.fm").await;
    assert!(t.users.is_user_in_registration_process(&alice()).await);
    assert!(!t.users.is_user_registered(&alice()).await);
}

#[tokio::test]
async fn test_register_twice_is_rejected() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!register")).await;
    t.bot.handle(&direct_message("!register")).await;

    wait_for_message(&t.signal_server, "already have a registration in progress").await;
}

#[tokio::test]
async fn test_cancel_command_stops_registration() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!register")).await;
    t.bot.handle(&direct_message("!cancel")).await;

    wait_for_message(&t.signal_server, "Registration cancelled").await;
    assert!(!t.users.is_user_in_registration_process(&alice()).await);

    // The collector is gone, so "done" is no longer consumed.
    t.bot.handle(&direct_message("done")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!t.users.is_user_registered(&alice()).await);
}

#[tokio::test]
async fn test_cancel_reply_stops_registration() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!register")).await;
    t.bot.handle(&direct_message("cancel")).await;

    wait_for_message(&t.signal_server, "Registration cancelled").await;
    assert!(!t.users.is_user_in_registration_process(&alice()).await);
}

#[tokio::test]
async fn test_follow_up_timeout_cancels_registration() {
    let t = test_bot(Duration::from_millis(100)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!register")).await;

    wait_for_message(&t.signal_server, "Registration timed out").await;
    assert!(!t.users.is_user_in_registration_process(&alice()).await);
}

#[tokio::test]
async fn test_unauthorized_token_ends_registration() {
    let t = test_bot(Duration::from_secs(60)).await;

    wiremock::Mock::given(wiremock::matchers::query_param("method", "auth.gettoken"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "token": "request-token" })),
        )
        .mount(&t.lastfm_server)
        .await;
    wiremock::Mock::given(wiremock::matchers::query_param("method", "auth.getsession"))
        .respond_with(wiremock::ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": 14,
            "message": "Unauthorized Token - This token has not been issued"
        })))
        .mount(&t.lastfm_server)
        .await;

    t.bot.handle(&direct_message("!register")).await;
    t.bot.handle(&direct_message("done")).await;

    wait_for_message(&t.signal_server, "not authorized").await;
    assert!(!t.users.is_user_in_registration_process(&alice()).await);
    assert!(!t.users.is_user_registered(&alice()).await);
}

#[tokio::test]
async fn test_scrobble_command() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;
    mount_lastfm_scrobble(&t.lastfm_server, 1).await;
    register(&t).await;

    t.bot
        .handle(&direct_message("!scrobble Radiohead - Airbag - OK Computer"))
        .await;
    wait_for_message(&t.signal_server, "Scrobbled Radiohead - Airbag").await;

    let requests = t.lastfm_server.received_requests().await.unwrap();
    let scrobble = requests
        .iter()
        .find(|r| r.method.to_string() == "POST")
        .unwrap();
    let body = String::from_utf8_lossy(&scrobble.body);
    assert!(body.contains("artist%5B0%5D=Radiohead"));
    assert!(body.contains("album%5B0%5D=OK+Computer"));
    assert!(body.contains("timestamp%5B0%5D=1700000000"));
    assert!(body.contains("sk=session-key"));
}

#[tokio::test]
async fn test_scrobbling_toggle() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;
    mount_lastfm_scrobble(&t.lastfm_server, 0).await;
    register(&t).await;

    t.bot.handle(&direct_message("!scrobbling off")).await;
    wait_for_message(&t.signal_server, "Scrobbling is now off").await;

    t.bot.handle(&direct_message("!scrobble Radiohead - Airbag")).await;
    wait_for_message(&t.signal_server, "Scrobbling is off").await;

    t.bot.handle(&direct_message("!scrobbling off")).await;
    wait_for_message(&t.signal_server, "already off").await;
}

#[tokio::test]
async fn test_scrobble_requires_registration() {
    let t = test_bot(Duration::from_secs(60)).await;

    t.bot.handle(&direct_message("!scrobble Radiohead - Airbag")).await;

    wait_for_message(&t.signal_server, "haven't linked a Last.fm account").await;
}

#[tokio::test]
async fn test_status_and_unregister() {
    let t = test_bot(Duration::from_secs(60)).await;
    mount_lastfm_handshake(&t.lastfm_server).await;

    t.bot.handle(&direct_message("!status")).await;
    wait_for_message(&t.signal_server, "No Last.fm account linked").await;

    register(&t).await;

    t.bot.handle(&direct_message("!status")).await;
    wait_for_message(&t.signal_server, "Linked to Last.fm user rj. Scrobbling is on.").await;

    t.bot.handle(&direct_message("!unregister")).await;
    wait_for_message(&t.signal_server, "has been unlinked").await;
    assert!(!t.users.is_user_registered(&alice()).await);
}

#[tokio::test]
async fn test_help_and_unknown_messages() {
    let t = test_bot(Duration::from_secs(60)).await;

    t.bot.handle(&direct_message("hello there")).await;
    t.bot.handle(&direct_message("!help")).await;

    wait_for_message(&t.signal_server, "!register").await;
    assert_eq!(sent_messages(&t.signal_server).await.len(), 1);
}
