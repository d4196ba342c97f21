//! Todo storage module for `DynamoDB` operations

mod error;
mod operation;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{TodoStorageError, TodoStorageResult};
pub use operation::{TodoChange, TodoOperation, TodoOutput, WriteCondition};
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};
use strum::Display;

/// Persisted todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Primary key, generated on create
    pub id: String,
    /// Owner, always taken from the caller identity
    pub username: String,
    /// Task text
    pub content: String,
    /// Completion flag
    pub status: bool,
}

/// `DynamoDB` attribute names for the todos table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TodoAttribute {
    /// Primary key
    Id,
    /// Owner (hash key of the username index)
    Username,
    /// Task text
    Content,
    /// Completion flag
    Status,
}

/// Identifier of a todo item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TodoId(String);

impl TodoId {
    /// Generates a fresh UUID v4 identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<TodoId> for String {
    fn from(id: TodoId) -> Self {
        id.0
    }
}

/// A store that executes todo operations
///
/// Each call issues exactly one request against the underlying store, and the
/// write condition is evaluated atomically with the write.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Executes a single operation
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError::ConditionFailed` if the write condition does not hold,
    /// `TodoStorageError::Unavailable` for transient store failures
    async fn execute(&self, operation: TodoOperation) -> TodoStorageResult<TodoOutput>;
}

/// Storage client for todo operations backed by `DynamoDB`
pub struct TodoStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    username_index_name: String,
}

impl TodoStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for todos
    /// * `username_index_name` - Name of the GSI keyed by username
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        username_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            username_index_name,
        }
    }

    /// Lists every item owned by `username`, following pagination
    async fn query_by_owner(&self, username: &str) -> TodoStorageResult<Vec<Todo>> {
        let mut todos = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let response = self
                .dynamodb_client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.username_index_name)
                .key_condition_expression("#username = :username")
                .expression_attribute_names("#username", TodoAttribute::Username.to_string())
                .expression_attribute_values(":username", AttributeValue::S(username.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            todos.extend(from_items::<_, Todo>(response.items.unwrap_or_default())?);

            exclusive_start_key = response.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(todos)
    }

    async fn put(&self, item: Todo, condition: &WriteCondition) -> TodoStorageResult<Todo> {
        let condition = condition.to_expression();

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(&item)?))
            .condition_expression(condition.expression)
            .set_expression_attribute_names(Some(condition.names))
            .set_expression_attribute_values(non_empty(condition.values))
            .send()
            .await?;

        Ok(item)
    }

    async fn update(
        &self,
        id: String,
        change: &TodoChange,
        condition: &WriteCondition,
    ) -> TodoStorageResult<Todo> {
        let condition = condition.to_expression();
        let (attribute, value) = change.attribute();

        let mut names = condition.names;
        names.insert("#field".to_string(), attribute.to_string());
        let mut values = condition.values;
        values.insert(":value".to_string(), value);

        let response = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(TodoAttribute::Id.to_string(), AttributeValue::S(id))
            .update_expression("SET #field = :value")
            .condition_expression(condition.expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;

        let attributes = response
            .attributes
            .ok_or(TodoStorageError::UnexpectedOutput("updated item attributes"))?;

        Ok(from_item(attributes)?)
    }

    async fn delete(&self, id: String, condition: &WriteCondition) -> TodoStorageResult<Todo> {
        let condition = condition.to_expression();

        let response = self
            .dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(TodoAttribute::Id.to_string(), AttributeValue::S(id))
            .condition_expression(condition.expression)
            .set_expression_attribute_names(Some(condition.names))
            .set_expression_attribute_values(non_empty(condition.values))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;

        let attributes = response
            .attributes
            .ok_or(TodoStorageError::UnexpectedOutput("deleted item attributes"))?;

        Ok(from_item(attributes)?)
    }
}

#[async_trait]
impl TodoStore for TodoStorage {
    async fn execute(&self, operation: TodoOperation) -> TodoStorageResult<TodoOutput> {
        let name = operation.name();

        let result = match operation {
            TodoOperation::QueryByOwner { username } => {
                self.query_by_owner(&username).await.map(TodoOutput::Items)
            }
            TodoOperation::Put { item, condition } => {
                self.put(item, &condition).await.map(TodoOutput::Item)
            }
            TodoOperation::Update {
                id,
                change,
                condition,
            } => self.update(id, &change, &condition).await.map(TodoOutput::Item),
            TodoOperation::Delete { id, condition } => {
                self.delete(id, &condition).await.map(TodoOutput::Item)
            }
        };

        if let Err(err) = &result {
            tracing::debug!(operation = name, "Todo store operation failed: {err}");
        }

        result
    }
}

/// `DynamoDB` rejects empty expression attribute maps
fn non_empty(values: HashMap<String, AttributeValue>) -> Option<HashMap<String, AttributeValue>> {
    (!values.is_empty()).then_some(values)
}
