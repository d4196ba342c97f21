use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Extension;

use crate::{graphql::TodoSchema, identity::CallerIdentity};

/// Executes a GraphQL request on behalf of the authenticated caller
pub async fn handler(
    caller: CallerIdentity,
    Extension(schema): Extension<TodoSchema>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let request = request.into_inner().data(caller);
    schema.execute(request).await.into()
}

/// Returns the schema in SDL form
#[allow(clippy::unused_async)]
pub async fn sdl(Extension(schema): Extension<TodoSchema>) -> String {
    schema.sdl()
}
