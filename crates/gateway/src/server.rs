use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{DefaultBodyLimit, State},
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::trace::TraceLayer,
    tracing::{info, warn},
};

use tutorbot_config::{Severity, TutorbotConfig, validate};

use crate::{notes_routes, state::GatewayState, webhook};

/// LINE caps webhook bodies well below this.
const MAX_BODY_BYTES: usize = 1024 * 1024;

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let app_state = AppState { gateway: state };

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/webhook", post(webhook::line_webhook))
        .route("/api/notes", post(notes_routes::create_note))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the gateway HTTP server and serve until ctrl-c.
pub async fn start_gateway(config: TutorbotConfig) -> anyhow::Result<()> {
    let report = validate(&config);
    for diagnostic in &report.diagnostics {
        warn!("{diagnostic}");
    }
    if report.has_errors() {
        anyhow::bail!(
            "config has {} error(s); run `tutorbot config check` for details",
            report.count(Severity::Error)
        );
    }

    let state = GatewayState::from_config(&config)?;
    let app = build_gateway_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        data_dir = %config.data.dir.display(),
        bindings = %config.bindings.path.display(),
        model = %config.llm.model,
        "gateway listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn index_handler() -> &'static str {
    "AI 助教系統運行中 ✅"
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
    }))
}
