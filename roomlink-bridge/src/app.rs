use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::SessionContext;
use crate::services::transport::websocket_router;

pub fn create_app(context: SessionContext) -> Router {
    websocket_router(context)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
