use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::stream;
use crate::state::AppState;
use std::sync::Arc;

/// Create the media stream router
///
/// The `/stream` endpoint is unauthenticated; the telephony provider connects
/// to the URL handed out by the call webhook.
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stream", get(stream::stream_handler))
        .layer(TraceLayer::new_for_http())
}
