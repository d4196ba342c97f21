use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use todo_storage::todo::TodoStore;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::graphql;
use crate::routes;
use crate::{identity::IdentityVerifier, types::Environment};

/// Upper bound on the time spent serving one request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the application router with its dependencies attached
///
/// `verifier` may only be `None` when the environment disables authentication.
pub fn router(
    environment: Environment,
    store: Arc<dyn TodoStore>,
    verifier: Option<Arc<IdentityVerifier>>,
) -> Router {
    let mut openapi = OpenApi::default();
    let schema = graphql::build_schema(store);

    let mut router = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(schema));

    if let Some(verifier) = verifier {
        router = router.layer(Extension(verifier));
    }

    router
}

/// Serves the API until a shutdown signal arrives
///
/// Requests are bounded by [`REQUEST_TIMEOUT`]. The listening port comes from `PORT`.
///
/// # Errors
///
/// Returns an error if `PORT` is not a valid port, the listener cannot bind, or the
/// server exits abnormally
pub async fn start(
    environment: Environment,
    store: Arc<dyn TodoStore>,
    verifier: Option<Arc<IdentityVerifier>>,
) -> anyhow::Result<()> {
    let port = Environment::port()?;

    let app = router(environment, store, verifier)
        // Trace id is echoed back to the client
        .layer(OtelInResponseLayer)
        .layer(OtelAxumLayer::default())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await?;
    tracing::info!("🔄 Todo API listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
