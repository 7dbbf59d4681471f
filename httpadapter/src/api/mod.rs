use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::service::fs::{mkdir, read_dir, remove, remove_all};
use crate::service::transfer::{download, upload};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mkdir/", post(mkdir))
        .route("/readdir/", post(read_dir))
        .route("/remove/", post(remove))
        .route("/removeall/", post(remove_all))
        // uploads are unbounded
        .route("/upload/", post(upload).layer(DefaultBodyLimit::disable()))
        .route("/download/", get(download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
