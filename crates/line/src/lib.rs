//! LINE Messaging API channel: webhook signature checks, event payloads and
//! the reply endpoint.

pub mod error;
pub mod outbound;
pub mod types;
pub mod webhook;

pub use {
    error::{Error, Result},
    outbound::{LineReplyClient, MAX_TEXT_CHARS, ReplyOutbound, truncate_text},
    types::{InboundText, WebhookEvent, WebhookPayload},
    webhook::{SIGNATURE_HEADER, parse_payload, text_messages, verify_signature},
};
