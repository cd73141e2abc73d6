// routes.rs
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/poll/{id}", get(handlers::get_poll))
        .route("/poll/{id}/results", get(handlers::get_results))
        .route("/vote", post(handlers::vote))
        .route(
            "/admin/polls",
            get(handlers::list_polls).post(handlers::create_poll),
        )
        .route("/admin/polls/{id}/options", put(handlers::update_options));

    Router::new().nest("/api", api).with_state(state)
}
