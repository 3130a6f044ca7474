//! Webhook payload types.
//!
//! Only the fields the gateway reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Bot user id the events were sent to.
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// `message`, `follow`, `unfollow`, `postback`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// `user`, `group` or `room`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A text message from a user, ready for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub identity: String,
    pub reply_token: String,
    pub text: String,
}

impl WebhookEvent {
    /// The routable text message in this event, if it is one.
    pub fn as_inbound_text(&self) -> Option<InboundText> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.kind != "text" {
            return None;
        }
        Some(InboundText {
            identity: self.source.as_ref()?.user_id.clone()?,
            reply_token: self.reply_token.clone()?,
            text: message.text.clone()?,
        })
    }
}
