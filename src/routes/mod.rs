pub mod projects;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/v1/projects",
            get(projects::list)
                .post(projects::create)
                .fallback(projects::method_not_allowed),
        )
        .route("/api/v1/projects/{slug}", get(projects::get))
}
