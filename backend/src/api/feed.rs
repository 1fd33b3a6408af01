//! Read side, polled by the status page and the Twitch extension.

use crate::AppState;
use axum::extract::State;
use axum::Json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn router() -> axum::Router<Arc<AppState>> {
    axum::Router::new()
        .route("/chat", axum::routing::get(chat))
        .route("/chat/all", axum::routing::get(all_chat))
        .route("/raw_lines", axum::routing::get(raw_lines))
        .route("/scoreboard", axum::routing::get(scoreboard))
        .route("/scoreboard/raw", axum::routing::get(raw_scoreboard))
        .route("/nicknames", axum::routing::get(nicknames))
}

async fn chat(State(state): State<Arc<AppState>>) -> Json<Vec<common::chat::ChatMessage>> {
    Json(state.read().display_chat())
}

async fn all_chat(State(state): State<Arc<AppState>>) -> Json<Vec<common::chat::DetectedChat>> {
    Json(state.read().detected_chat())
}

async fn raw_lines(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.read().raw_lines())
}

async fn scoreboard(
    State(state): State<Arc<AppState>>,
) -> Json<common::scoreboard::ScoreboardSnapshot> {
    let snapshot = state.read().scoreboard();
    Json(snapshot.as_ref().clone())
}

async fn raw_scoreboard(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<common::scoreboard::RawScoreboardInput>> {
    Json(state.read().raw_scoreboard_inputs())
}

async fn nicknames(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, String>> {
    Json(state.read().nicknames())
}
