use crate::{AppState, update_self, version};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::limit::RequestBodyLimitLayer;

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .nest("/api/v1", api_routes())
        .with_state(state)
        // Uploads are bounded by update.max_upload_bytes instead of axum's 2 MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/version", get(version))
        .route("/update/self", post(update_self))
}
