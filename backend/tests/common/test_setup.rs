use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};
use todo_backend::{identity::IdentityVerifier, server, types::Environment};
use todo_storage::{memory::InMemoryTodoStore, todo::TodoStore};
use tower::ServiceExt;

pub const TEST_ISSUER: &str = "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_test";
pub const TEST_CLIENT_ID: &str = "test-client";
const TEST_SECRET: &[u8] = b"test-signing-secret";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Signs an id token for `username` the test verifier accepts
pub fn id_token(username: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "cognito:username": username,
            "token_use": "id",
            "aud": TEST_CLIENT_ID,
            "iss": TEST_ISSUER,
            "exp": get_current_timestamp() + 3600,
        }),
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("Failed to sign test token")
}

/// Router wired to an in-memory store and a static-key verifier
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryTodoStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryTodoStore::new()))
    }

    pub fn with_store(store: Arc<InMemoryTodoStore>) -> Self {
        let router = Self::router_for(store.clone(), false);
        Self { router, store }
    }

    /// Router whose store is an arbitrary implementation
    pub fn router_for(store: Arc<dyn TodoStore>, disable_auth: bool) -> Router {
        setup_test_env();

        let environment = Environment::Development {
            disable_auth,
            in_memory_store: true,
        };
        let verifier = Arc::new(IdentityVerifier::with_static_key(
            TEST_ISSUER,
            Some(TEST_CLIENT_ID.to_string()),
            DecodingKey::from_secret(TEST_SECRET),
            Algorithm::HS256,
        ));

        server::router(environment, store, Some(verifier))
    }

    /// Sends a GraphQL request with the given bearer token
    pub async fn graphql(&self, token: Option<&str>, query: &str, variables: Value) -> Response {
        send_graphql(&self.router, token, query, variables).await
    }

    /// Sends a GraphQL request as `username` and returns the JSON body
    pub async fn graphql_as(&self, username: &str, query: &str, variables: Value) -> Value {
        let response = self
            .graphql(Some(&id_token(username)), query, variables)
            .await;
        assert_eq!(response.status(), 200);
        parse_response_body(response).await
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn send_graphql(
    router: &Router,
    token: Option<&str>,
    query: &str,
    variables: Value,
) -> Response {
    let authorization = token.map(|token| format!("Bearer {token}"));
    send_graphql_with_authorization(router, authorization.as_deref(), query, variables).await
}

/// Send a GraphQL request with a raw `Authorization` header value
pub async fn send_graphql_with_authorization(
    router: &Router,
    authorization: Option<&str>,
    query: &str,
    variables: Value,
) -> Response {
    let mut builder = Request::builder()
        .uri("/graphql")
        .method("POST")
        .header("Content-Type", "application/json");

    if let Some(authorization) = authorization {
        builder = builder.header("Authorization", authorization);
    }

    let body = json!({ "query": query, "variables": variables });
    let request = builder.body(Body::from(body.to_string())).unwrap();

    router.clone().oneshot(request).await.unwrap()
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// First GraphQL error code in a response body
pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}

pub const TODOS: &str = "query { todos { id username content status } }";

pub const CREATE_TODO: &str = "mutation($content: String!) {
    createTodo(content: $content) { id username content status }
}";

pub const EDIT_TODO_CONTENT: &str = "mutation($id: ID!, $newContent: String!) {
    editTodoContent(id: $id, newContent: $newContent) { id username content status }
}";

pub const TOGGLE_TODO_STATUS: &str = "mutation($id: ID!, $newStatus: Boolean!) {
    toggleTodoStatus(id: $id, newStatus: $newStatus) { id username content status }
}";

pub const DELETE_TODO: &str = "mutation($id: ID!) {
    deleteTodo(id: $id) { id username content status }
}";
