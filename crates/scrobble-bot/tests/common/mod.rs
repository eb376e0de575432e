//! Common test utilities for integration tests.

use lastfm_client::LastfmClient;
use scrobble_bot::bot::Bot;
use scrobble_bot::Users;
use signal_client::{BotMessage, SignalClient};
use std::sync::Arc;
use std::time::Duration;
use user_registry::UsersService;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOT_NUMBER: &str = "+15555555555";
pub const USER_NUMBER: &str = "+14155551234";
pub const LASTFM_USER: &str = "rj";

/// Create a Last.fm client configured for a mock server.
pub fn test_lastfm_client(mock_server: &MockServer) -> LastfmClient {
    LastfmClient::new(
        "test-api-key",
        "test-secret",
        format!("{}/2.0/", mock_server.uri()),
        "https://www.last.fm/api/auth/",
        Duration::from_secs(5),
    )
    .unwrap()
}

/// Mount the Last.fm handshake: token, then session.
pub async fn mount_lastfm_handshake(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", "auth.gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "request-token"
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", "auth.getsession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session": { "name": LASTFM_USER, "key": "session-key", "subscriber": 0 }
        })))
        .mount(mock_server)
        .await;
}

/// Accept scrobbles, expecting exactly `times` submissions.
pub async fn mount_lastfm_scrobble(mock_server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/2.0/"))
        .and(body_string_contains("method=track.scrobble"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scrobbles": { "@attr": { "accepted": 1, "ignored": 0 } }
        })))
        .expect(times)
        .mount(mock_server)
        .await;
}

/// Accept every outgoing Signal message.
pub async fn mount_signal_send(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/send"))
        .respond_with(ResponseTemplate::new(201))
        .mount(mock_server)
        .await;
}

pub struct TestBot {
    pub bot: Bot,
    pub users: Arc<Users>,
    pub lastfm_server: MockServer,
    pub signal_server: MockServer,
}

/// A bot wired to mock Last.fm and Signal servers.
pub async fn test_bot(follow_up_timeout: Duration) -> TestBot {
    let lastfm_server = MockServer::start().await;
    let signal_server = MockServer::start().await;
    mount_signal_send(&signal_server).await;

    let users = Arc::new(UsersService::new(Arc::new(test_lastfm_client(&lastfm_server))));
    let signal = SignalClient::new(signal_server.uri(), BOT_NUMBER).unwrap();
    let bot = Bot::new(users.clone(), signal, follow_up_timeout);

    TestBot {
        bot,
        users,
        lastfm_server,
        signal_server,
    }
}

/// A direct message from the test user.
pub fn direct_message(text: &str) -> BotMessage {
    BotMessage {
        source: USER_NUMBER.into(),
        source_name: Some("Alice".into()),
        text: text.into(),
        timestamp: 1_700_000_000_000,
        is_group: false,
        group_id: None,
        receiving_account: BOT_NUMBER.into(),
    }
}

/// A message from the test user posted in a group.
pub fn group_message(text: &str) -> BotMessage {
    BotMessage {
        group_id: Some("group-1".into()),
        is_group: true,
        ..direct_message(text)
    }
}

/// Texts the bot sent through Signal, paired with their recipient.
pub async fn sent_messages(signal_server: &MockServer) -> Vec<(String, String)> {
    signal_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/v2/send")
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            (
                body["recipients"][0].as_str().unwrap_or_default().to_string(),
                body["message"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// Wait until the bot has sent a message containing `needle`.
pub async fn wait_for_message(signal_server: &MockServer, needle: &str) -> (String, String) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(found) = sent_messages(signal_server)
            .await
            .into_iter()
            .find(|(_, text)| text.contains(needle))
        {
            return found;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "no message containing {:?}",
            needle
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
