pub mod api;
pub mod ws;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// The complete application router.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api::create_api_router())
        .merge(ws::create_ws_router())
        .with_state(state)
}
