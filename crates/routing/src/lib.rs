//! Per-message session routing for the chat gateway.
//!
//! Each inbound text is routed from the current binding state, in priority
//! order:
//! 1. Logout (message contains a logout phrase)
//! 2. Test passthrough (identity is on the test allow-list)
//! 3. Bound query (identity has a binding; the access guard applies)
//! 4. Unauthenticated (the message is treated as a login attempt)

pub mod error;
pub mod guard;
pub mod login;
pub mod messages;
pub mod router;

#[cfg(test)]
mod testing;

pub use {
    error::{Error, Result},
    guard::{AccessPolicy, MentionsBoundSubject},
    login::{LoginOutcome, RejectReason, parse_login},
    router::{Reply, Route, RouteDecision, RouterSettings, SessionRouter},
};
