use crate::{handlers, state::AppState};
use axum::{routing::get, Router};

/// Create the item and probe routes
pub fn create_api_routes(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        .route("/items", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/items/:id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .with_state(state)
}
