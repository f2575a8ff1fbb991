mod handlers;

use axum::{
    routing::{get, patch, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .route("/todos/{id}/done", patch(handlers::toggle_done))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
