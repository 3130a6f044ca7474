//! `POST /api/notes`: teachers record a dated note about a student.

use {
    axum::{
        extract::{Json, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde::Deserialize,
    tracing::{info, warn},
};

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

/// Save `comment` as today's note for `name`, replacing any earlier note
/// from the same day.
pub async fn create_note(State(state): State<AppState>, Json(req): Json<NoteRequest>) -> Response {
    let name = req.name.trim();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "name is required" })),
        )
            .into_response();
    }

    let today = chrono::Local::now().date_naive();
    match state.gateway.notes.write_note(name, today, &req.comment).await {
        Ok(path) => {
            info!(student = name, path = %path.display(), "teacher note saved");
            Json(serde_json::json!({
                "saved": true,
                "name": name,
                "path": path.display().to_string(),
            }))
            .into_response()
        },
        Err(e @ tutorbot_students::Error::InvalidName(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            warn!(student = name, error = %e, "could not save teacher note");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "could not save note" })),
            )
                .into_response()
        },
    }
}
