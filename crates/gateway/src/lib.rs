//! HTTP gateway: the LINE webhook, teacher note intake and health probes.
//!
//! Lifecycle:
//! 1. Load + validate config
//! 2. Build the binding store, student data, answer service and session router
//! 3. Serve HTTP until ctrl-c

pub mod notes_routes;
pub mod server;
pub mod state;
pub mod webhook;

pub use {
    server::{AppState, build_gateway_app, start_gateway},
    state::GatewayState,
};
