//! Inbound webhook handling.

use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    hmac::{Hmac, Mac},
    sha2::Sha256,
    tracing::{debug, warn},
};

use crate::{
    Result,
    types::{InboundText, WebhookPayload},
};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Verify the webhook signature from LINE.
///
/// The `X-Line-Signature` header carries base64(HMAC-SHA256(channel secret,
/// raw body)).
pub fn verify_signature(body: &[u8], signature_header: &str, channel_secret: &str) -> bool {
    let signature = signature_header.trim();
    if signature.is_empty() {
        warn!("empty signature header");
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("failed to create HMAC");
            return false;
        },
    };

    mac.update(body);
    let computed = STANDARD.encode(mac.finalize().into_bytes());

    constant_time_eq(&computed, signature)
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

pub fn parse_payload(body: &[u8]) -> Result<WebhookPayload> {
    Ok(serde_json::from_slice(body)?)
}

/// Text messages from users, in delivery order. Other events are skipped.
pub fn text_messages(payload: &WebhookPayload) -> Vec<InboundText> {
    payload
        .events
        .iter()
        .filter_map(|event| {
            let inbound = event.as_inbound_text();
            if inbound.is_none() {
                debug!(kind = %event.kind, "ignoring non-text event");
            }
            inbound
        })
        .collect()
}
