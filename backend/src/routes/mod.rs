mod docs;
pub mod graphql;
pub mod health;

use aide::axum::{routing::get as api_get, ApiRouter};
use axum::{
    middleware,
    routing::{get, post},
};

use crate::middleware::auth_middleware;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    let public_routes = ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", api_get(health::handler))
        .route("/graphql/schema", get(graphql::sdl));

    let protected_routes = ApiRouter::new()
        .route("/graphql", post(graphql::handler))
        .layer(middleware::from_fn(auth_middleware));

    public_routes.merge(protected_routes)
}
