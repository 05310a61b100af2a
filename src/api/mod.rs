mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    Router::new()
        // Dashboard
        .route("/", get(handlers::dashboard))
        // Task actions, each answered with a redirect back to the dashboard
        .route("/tasks", post(handlers::add_task))
        .route("/tasks/{id}", post(handlers::save_task))
        .route("/tasks/{id}/delete", post(handlers::delete_task))
        // Health
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
