pub mod auth;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod middleware;
pub mod models;
pub mod provisioning;
pub mod registrar;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::ProjectStore;
use crate::directory::ProjectDirectory;
use crate::provisioning::{ProjectPolicy, Provisioner};
use crate::registrar::DomainRegistrar;
use crate::state::{AppState, SharedState};

pub fn build_app(
    config: Config,
    store: Arc<dyn ProjectStore>,
    registrar: Arc<dyn DomainRegistrar>,
) -> Router {
    let policy = Arc::new(ProjectPolicy::new(&config.root_domain, &config.reserved_slugs));
    tracing::info!(
        root_domain = policy.root_domain(),
        extra_reserved = config.reserved_slugs.len(),
        "Project policy loaded"
    );

    let max_body_size = config.max_body_size;
    let state: SharedState = Arc::new(AppState {
        directory: ProjectDirectory::new(store.clone()),
        provisioner: Provisioner::new(store, registrar, policy),
        config,
    });

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
