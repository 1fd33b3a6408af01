use crate::AppState;
use std::sync::Arc;

pub mod feed;
pub mod logs;

pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .merge(logs::router())
        .merge(feed::router())
        .with_state(state)
}
