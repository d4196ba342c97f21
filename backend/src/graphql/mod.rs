//! GraphQL API binding
//!
//! Exposes one query and four mutations. Every resolver maps its arguments through
//! [`crate::resolvers`] and issues a single store operation. The caller identity is
//! attached to each request by the HTTP layer and is never a GraphQL argument.

/// Resolver error mapping
pub mod error;

use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, Object, Result, Schema, SimpleObject, ID,
};
use todo_storage::todo::{Todo, TodoId, TodoOperation, TodoOutput, TodoStore};

use crate::identity::CallerIdentity;
use crate::resolvers::{
    self, CreateTodoArgs, DeleteTodoArgs, EditTodoContentArgs, ToggleTodoStatusArgs,
};
pub use error::ResolverError;

/// Executable schema of the todo API
pub type TodoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Builds the schema around a todo store
#[must_use]
pub fn build_schema(store: Arc<dyn TodoStore>) -> TodoSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

/// A todo item as returned to clients
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Todo")]
pub struct TodoObject {
    /// Server-generated identifier
    pub id: ID,
    /// Owner of the item
    pub username: String,
    /// Task text
    pub content: String,
    /// Completion flag
    pub status: bool,
}

impl From<Todo> for TodoObject {
    fn from(todo: Todo) -> Self {
        Self {
            id: ID(todo.id),
            username: todo.username,
            content: todo.content,
            status: todo.status,
        }
    }
}

fn caller<'a>(ctx: &'a Context<'_>) -> Result<&'a CallerIdentity> {
    ctx.data::<CallerIdentity>()
        .map_err(|_| ResolverError::Unauthenticated.extend())
}

async fn execute(ctx: &Context<'_>, operation: TodoOperation) -> Result<TodoOutput> {
    let store = ctx.data::<Arc<dyn TodoStore>>()?;

    tracing::debug!(operation = operation.name(), "Executing todo operation");

    store
        .execute(operation)
        .await
        .map_err(|err| ResolverError::from(err).extend())
}

async fn execute_item(ctx: &Context<'_>, operation: TodoOperation) -> Result<TodoObject> {
    let todo = execute(ctx, operation)
        .await?
        .into_item()
        .map_err(|err| ResolverError::from(err).extend())?;

    Ok(todo.into())
}

/// Root query type
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    /// Items owned by the caller
    async fn todos(&self, ctx: &Context<'_>) -> Result<Vec<TodoObject>> {
        let operation = resolvers::todos(caller(ctx)?);

        let todos = execute(ctx, operation)
            .await?
            .into_items()
            .map_err(|err| ResolverError::from(err).extend())?;

        Ok(todos.into_iter().map(TodoObject::from).collect())
    }
}

/// Root mutation type
pub struct MutationRoot;

#[Object(name = "Mutation")]
impl MutationRoot {
    /// Creates an item owned by the caller
    async fn create_todo(&self, ctx: &Context<'_>, content: String) -> Result<TodoObject> {
        let operation = resolvers::create_todo(
            CreateTodoArgs { content },
            caller(ctx)?,
            TodoId::generate(),
        );

        execute_item(ctx, operation).await
    }

    /// Replaces the content of one of the caller's items
    async fn edit_todo_content(
        &self,
        ctx: &Context<'_>,
        id: ID,
        new_content: String,
    ) -> Result<TodoObject> {
        let operation = resolvers::edit_todo_content(
            EditTodoContentArgs {
                id: id.0,
                new_content,
            },
            caller(ctx)?,
        );

        execute_item(ctx, operation).await
    }

    /// Sets the completion status of one of the caller's items
    async fn toggle_todo_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        new_status: bool,
    ) -> Result<TodoObject> {
        let operation = resolvers::toggle_todo_status(
            ToggleTodoStatusArgs {
                id: id.0,
                new_status,
            },
            caller(ctx)?,
        );

        execute_item(ctx, operation).await
    }

    /// Deletes one of the caller's items and returns it
    async fn delete_todo(&self, ctx: &Context<'_>, id: ID) -> Result<TodoObject> {
        let operation = resolvers::delete_todo(DeleteTodoArgs { id: id.0 }, caller(ctx)?);

        execute_item(ctx, operation).await
    }
}
