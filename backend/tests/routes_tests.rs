mod common;

use common::*;
use http::StatusCode;

#[tokio::test]
async fn test_health_is_public() {
    let context = TestSetup::new();

    let response = context.send_get_request("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_schema_sdl_is_public() {
    let context = TestSetup::new();

    let response = context.send_get_request("/graphql/schema").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let sdl = String::from_utf8(body.to_vec()).unwrap();
    assert!(sdl.contains("type Todo"));
    assert!(sdl.contains("createTodo"));
}

#[tokio::test]
async fn test_openapi_served_in_development() {
    let context = TestSetup::new();

    let response = context.send_get_request("/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["paths"]["/health"].is_object());
    assert_eq!(body["info"]["title"], "Todo API");
}
