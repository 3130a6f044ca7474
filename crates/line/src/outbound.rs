use {
    anyhow::Result,
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

/// LINE rejects text messages longer than this many characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Sends a reply to the event identified by a reply token.
#[async_trait]
pub trait ReplyOutbound: Send + Sync {
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()>;
}

/// Cut `text` to [`MAX_TEXT_CHARS`] characters.
pub fn truncate_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Reply client for the Messaging API `POST /v2/bot/message/reply`.
pub struct LineReplyClient {
    http: reqwest::Client,
    api_base: String,
    access_token: Secret<String>,
}

impl LineReplyClient {
    pub fn new(access_token: Secret<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }
}

#[async_trait]
impl ReplyOutbound for LineReplyClient {
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        let text = truncate_text(text);
        let payload = serde_json::json!({
            "replyToken": reply_token,
            "messages": [{ "type": "text", "text": text }],
        });

        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("LINE reply failed ({status}): {body}");
        }
        debug!(chars = text.chars().count(), "sent LINE reply");
        Ok(())
    }
}
