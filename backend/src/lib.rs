pub mod api;
pub mod config;

mod submitter;
pub use submitter::{bearer_token, Submitter};

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// State shared by all handlers.
///
/// The engine sits behind a single lock: a submission holds the write lock
/// for its whole batch, reads only take a short read lock and copy out.
pub struct AppState {
    engine: RwLock<analysis::Engine>,
    pub submit_token: Option<String>,
}

impl AppState {
    pub fn new(engine: analysis::Engine, submit_token: Option<String>) -> Self {
        Self {
            engine: RwLock::new(engine),
            submit_token,
        }
    }

    pub fn from_config(config: &config::Config) -> Self {
        Self::new(
            analysis::Engine::new(config.engine_config()),
            config.submit_token(),
        )
    }

    pub fn submit(&self, lines: &[String]) -> Result<common::SubmitSummary, analysis::IngestError> {
        // The engine is consistent between lines, so a panic elsewhere does
        // not leave it unusable.
        let mut engine = self.engine.write().unwrap_or_else(PoisonError::into_inner);
        engine.submit(lines)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, analysis::Engine> {
        self.engine.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("request body is empty")]
    Empty,
    #[error("request body is not valid UTF-8")]
    NotUtf8,
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSON body must contain a \"lines\" list")]
    MissingLines,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Extract(#[from] ExtractError),
    #[error("no log lines found in the request")]
    Ingest(#[from] analysis::IngestError),
    #[error("missing or invalid submit token")]
    Unauthorized,
    #[error("processing failed: {0}")]
    Internal(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::Extract(_) | Self::Ingest(_) => axum::http::StatusCode::BAD_REQUEST,
            Self::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
            Self::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });

        (self.status(), axum::Json(body)).into_response()
    }
}

/// Turns a submission body into log lines.
///
/// JSON bodies carry the lines in a `lines` list, anything else is taken as
/// plain text with one log line per line.
pub fn extract_lines(content_type: Option<&str>, body: &[u8]) -> Result<Vec<String>, ExtractError> {
    if body.is_empty() {
        return Err(ExtractError::Empty);
    }

    let is_json = content_type
        .map(|c| c.trim().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        let document: serde_json::Value = serde_json::from_slice(body)?;
        let lines = document
            .get("lines")
            .and_then(serde_json::Value::as_array)
            .ok_or(ExtractError::MissingLines)?;

        return Ok(lines
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(str::to_owned)
            .collect());
    }

    let text = std::str::from_utf8(body).map_err(|_| ExtractError::NotUtf8)?;
    Ok(text.lines().map(str::to_owned).collect())
}
