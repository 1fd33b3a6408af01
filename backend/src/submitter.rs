use crate::{ApiError, AppState};
use std::sync::Arc;

/// Extracting this succeeds only for requests allowed to submit log lines.
#[derive(Debug)]
pub struct Submitter;

/// Token of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token.trim()).filter(|t| !t.is_empty())
}

#[async_trait::async_trait]
impl axum::extract::FromRequestParts<Arc<AppState>> for Submitter {
    type Rejection = ApiError;

    async fn from_request_parts(
        req: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let expected = match state.submit_token.as_deref() {
            Some(t) => t,
            None => return Ok(Self),
        };

        let provided = req
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token);

        if provided == Some(expected) {
            Ok(Self)
        } else {
            tracing::warn!("Rejected submission without a valid token");
            Err(ApiError::Unauthorized)
        }
    }
}
