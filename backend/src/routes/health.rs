use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::types::Environment;

/// Backing store the service was started with
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// Package version
    semver: &'static str,
    /// Git revision the binary was built from, when known
    rev: Option<&'static str>,
    store: StoreBackend,
}

/// Liveness probe with build information
pub async fn handler(Extension(environment): Extension<Environment>) -> impl IntoApiResponse {
    let store = if environment.use_in_memory_store() {
        StoreBackend::Memory
    } else {
        StoreBackend::DynamoDb
    };

    Json(HealthResponse {
        status: "ok",
        semver: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
        store,
    })
}
