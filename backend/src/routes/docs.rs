use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Extension, Json};

use crate::types::Environment;

pub fn handler() -> ApiRouter {
    ApiRouter::new().route("/openapi.json", get(openapi_document))
}

/// Serves the OpenAPI document of the REST routes; hidden in production
#[allow(clippy::unused_async)]
async fn openapi_document(
    Extension(environment): Extension<Environment>,
    Extension(mut openapi): Extension<OpenApi>,
) -> impl IntoResponse {
    if !environment.show_api_docs() {
        return StatusCode::NOT_FOUND.into_response();
    }

    openapi.info.title = "Todo API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("GraphQL is served at `POST /graphql`; its SDL at `GET /graphql/schema`.".to_string());

    Json(openapi).into_response()
}
