//! `POST /webhook`: LINE Messaging API events.

use {
    axum::{
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
    },
    tracing::{info, warn},
};

use tutorbot_line::{SIGNATURE_HEADER, parse_payload, text_messages, verify_signature};

use crate::server::AppState;

/// Verify, route every text message, and reply through the reply API.
///
/// A missing or bad signature is rejected before the body is looked at.
/// Reply failures are logged; LINE still gets `OK` so it does not redeliver.
pub async fn line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let gateway = &state.gateway;

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("webhook without signature header");
        return (StatusCode::BAD_REQUEST, "missing signature").into_response();
    };
    if !verify_signature(&body, signature, gateway.channel_secret()) {
        warn!("webhook signature mismatch");
        return (StatusCode::BAD_REQUEST, "invalid signature").into_response();
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unparseable webhook body");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        },
    };

    for inbound in text_messages(&payload) {
        let reply = gateway.router.handle(&inbound.identity, &inbound.text).await;
        info!(
            identity = %inbound.identity,
            route = reply.route.map(|r| r.as_str()).unwrap_or("none"),
            "handled message"
        );
        if let Err(e) = gateway
            .outbound
            .reply_text(&inbound.reply_token, &reply.text)
            .await
        {
            warn!(identity = %inbound.identity, error = %e, "failed to send reply");
        }
    }

    "OK".into_response()
}
