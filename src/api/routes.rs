use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Session
        .route("/auth/signin", get(handlers::sign_in))
        .route("/auth/signout", post(handlers::sign_out))
        .route("/me", get(handlers::me))
        // Journal
        .route("/movies", get(handlers::list_movies).post(handlers::add_movie))
        .route("/movies/:id", delete(handlers::delete_movie))
        // Metadata
        .route("/search", get(handlers::search_movies))
        .route("/genres", get(handlers::list_genres))
        // Yearly summary
        .route("/summary", get(handlers::yearly_summary))
}
