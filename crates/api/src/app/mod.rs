//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: account operations and the shared guard chain
//! - `routes/`: HTTP routes + handlers, grouped by guard policy
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from already wired services.
///
/// Route groups the registry cannot serve are logged here; each request to
/// them fails with a configuration error until the deployment is fixed.
pub fn router(services: Arc<AppServices>) -> Router {
    for (group, err) in services.configuration_gaps(&routes::policies::all()) {
        tracing::error!(%group, error = %err, "route group cannot be authorized");
    }

    let protected = routes::router(&services.guard);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
