use crate::{ApiError, AppState, Submitter};
use axum::extract::State;
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: common::SubmitSummary,
}

pub fn router() -> axum::Router<Arc<AppState>> {
    axum::Router::new().route(
        "/submit_logs",
        axum::routing::post(submit_logs)
            .layer(axum::extract::DefaultBodyLimit::max(10 * 1024 * 1024)),
    )
}

#[tracing::instrument(skip_all)]
async fn submit_logs(
    State(state): State<Arc<AppState>>,
    _submitter: Submitter,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<axum::Json<SubmitResponse>, ApiError> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let lines = crate::extract_lines(content_type, &body).map_err(|e| {
        tracing::warn!("Unusable submission: {}", e);
        e
    })?;
    tracing::info!("Received {} log lines", lines.len());

    let summary = tokio::task::spawn_blocking(move || state.submit(&lines)).await??;

    if summary.chat_messages_added > 0 {
        tracing::info!("Added {} chat messages", summary.chat_messages_added);
    }

    Ok(axum::Json(SubmitResponse {
        status: "success",
        summary,
    }))
}
