//! Signal API types.

use serde::{Deserialize, Serialize};

/// Incoming Signal message.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub envelope: Envelope,
    pub account: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub source: String,
    #[serde(rename = "sourceNumber")]
    pub source_number: Option<String>,
    #[serde(rename = "sourceName")]
    pub source_name: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "dataMessage")]
    pub data_message: Option<DataMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataMessage {
    pub message: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "groupInfo")]
    pub group_info: Option<GroupInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    #[serde(rename = "groupId")]
    pub group_id: String,
}

/// Outgoing message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub number: String,
    pub recipients: Vec<String>,
}

/// A text message addressed to the bot.
#[derive(Debug, Clone)]
pub struct BotMessage {
    /// Stable identifier of the sender.
    pub source: String,
    /// Profile name of the sender, if shared.
    pub source_name: Option<String>,
    /// The message text, trimmed.
    pub text: String,
    pub timestamp: i64,
    pub is_group: bool,
    pub group_id: Option<String>,
    /// The bot account that received this message.
    pub receiving_account: String,
}

impl BotMessage {
    /// Extract a text message from an incoming envelope.
    ///
    /// Receipts, typing notifications and empty messages yield `None`.
    pub fn from_incoming(msg: &IncomingMessage) -> Option<Self> {
        let data = msg.envelope.data_message.as_ref()?;
        let text = data.message.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            source: msg.envelope.source.clone(),
            source_name: msg
                .envelope
                .source_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
            text: text.to_string(),
            timestamp: msg.envelope.timestamp,
            is_group: data.group_info.is_some(),
            group_id: data.group_info.as_ref().map(|g| g.group_id.clone()),
            receiving_account: msg.account.clone(),
        })
    }

    /// Where a reply should go: the group for group messages, else the sender.
    pub fn reply_target(&self) -> &str {
        self.group_id.as_deref().unwrap_or(&self.source)
    }

    /// Human-readable sender name, falling back to the sender id.
    pub fn display_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or(&self.source)
    }

    /// Whether the text is `trigger` on its own or followed by whitespace.
    pub fn is_command(&self, trigger: &str) -> bool {
        self.text
            .strip_prefix(trigger)
            .map(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .unwrap_or(false)
    }

    /// Text after a command trigger, e.g. `"on"` for `"!scrobbling on"`.
    pub fn argument(&self, trigger: &str) -> Option<&str> {
        if !self.is_command(trigger) {
            return None;
        }
        Some(self.text[trigger.len()..].trim()).filter(|rest| !rest.is_empty())
    }
}
