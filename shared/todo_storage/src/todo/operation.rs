//! Typed store operations
//!
//! Every API operation maps to exactly one `TodoOperation`. Writes carry the
//! precondition the store must evaluate atomically with the write itself.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use super::{Todo, TodoAttribute, TodoStorageError, TodoStorageResult};

/// Precondition evaluated by the store as part of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// No item with the written id may exist yet
    ItemAbsent,
    /// The item must exist and be owned by this username
    OwnedBy(String),
}

impl WriteCondition {
    /// Evaluates the condition against the currently stored item
    #[must_use]
    pub fn holds(&self, existing: Option<&Todo>) -> bool {
        match self {
            Self::ItemAbsent => existing.is_none(),
            Self::OwnedBy(username) => existing.is_some_and(|todo| &todo.username == username),
        }
    }

    pub(crate) fn to_expression(&self) -> ConditionExpression {
        let mut names = HashMap::from([("#id".to_string(), TodoAttribute::Id.to_string())]);
        let mut values = HashMap::new();

        let expression = match self {
            Self::ItemAbsent => "attribute_not_exists(#id)",
            Self::OwnedBy(username) => {
                names.insert("#username".to_string(), TodoAttribute::Username.to_string());
                values.insert(":caller".to_string(), AttributeValue::S(username.clone()));
                "attribute_exists(#id) AND #username = :caller"
            }
        };

        ConditionExpression {
            expression,
            names,
            values,
        }
    }
}

/// `DynamoDB` rendering of a [`WriteCondition`]
pub(crate) struct ConditionExpression {
    pub expression: &'static str,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Single-attribute change applied by an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoChange {
    /// Replace the task text
    Content(String),
    /// Set the completion flag
    Status(bool),
}

impl TodoChange {
    /// Applies the change to an item in place
    pub fn apply(&self, todo: &mut Todo) {
        match self {
            Self::Content(content) => todo.content.clone_from(content),
            Self::Status(status) => todo.status = *status,
        }
    }

    pub(crate) fn attribute(&self) -> (TodoAttribute, AttributeValue) {
        match self {
            Self::Content(content) => (TodoAttribute::Content, AttributeValue::S(content.clone())),
            Self::Status(status) => (TodoAttribute::Status, AttributeValue::Bool(*status)),
        }
    }
}

/// One request against the todo store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoOperation {
    /// Range query on the username index
    QueryByOwner {
        /// Owner whose items are listed
        username: String,
    },
    /// Conditional put of a complete item
    Put {
        /// Item to write
        item: Todo,
        /// Precondition on the existing item with the same id
        condition: WriteCondition,
    },
    /// Conditional update of one attribute
    Update {
        /// Key of the item to update
        id: String,
        /// Attribute to change
        change: TodoChange,
        /// Precondition on the existing item
        condition: WriteCondition,
    },
    /// Conditional delete
    Delete {
        /// Key of the item to delete
        id: String,
        /// Precondition on the existing item
        condition: WriteCondition,
    },
}

impl TodoOperation {
    /// Short operation name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::QueryByOwner { .. } => "query_by_owner",
            Self::Put { .. } => "put",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Result of executing a [`TodoOperation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoOutput {
    /// The written, updated or deleted item
    Item(Todo),
    /// Items returned by a query
    Items(Vec<Todo>),
}

impl TodoOutput {
    /// Unwraps a single item
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError::UnexpectedOutput` if the output is a list
    pub fn into_item(self) -> TodoStorageResult<Todo> {
        match self {
            Self::Item(todo) => Ok(todo),
            Self::Items(_) => Err(TodoStorageError::UnexpectedOutput("a single item")),
        }
    }

    /// Unwraps a list of items
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError::UnexpectedOutput` if the output is a single item
    pub fn into_items(self) -> TodoStorageResult<Vec<Todo>> {
        match self {
            Self::Items(todos) => Ok(todos),
            Self::Item(_) => Err(TodoStorageError::UnexpectedOutput("a list of items")),
        }
    }
}
