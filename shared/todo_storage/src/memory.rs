//! In-memory todo store
//!
//! Mirrors the conditional semantics of the `DynamoDB` store. Every operation runs
//! under a single lock acquisition, so a condition and its write are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::todo::{
    Todo, TodoOperation, TodoOutput, TodoStorageError, TodoStorageResult, TodoStore,
};

/// Todo store kept in process memory
#[derive(Default)]
pub struct InMemoryTodoStore {
    items: RwLock<HashMap<String, Todo>>,
}

impl InMemoryTodoStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an item by id, bypassing ownership checks
    pub async fn get(&self, id: &str) -> Option<Todo> {
        self.items.read().await.get(id).cloned()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn execute(&self, operation: TodoOperation) -> TodoStorageResult<TodoOutput> {
        match operation {
            TodoOperation::QueryByOwner { username } => {
                let items = self.items.read().await;
                let mut todos: Vec<Todo> = items
                    .values()
                    .filter(|todo| todo.username == username)
                    .cloned()
                    .collect();
                todos.sort_by(|a, b| a.id.cmp(&b.id));
                Ok(TodoOutput::Items(todos))
            }
            TodoOperation::Put { item, condition } => {
                let mut items = self.items.write().await;
                if !condition.holds(items.get(&item.id)) {
                    return Err(TodoStorageError::ConditionFailed);
                }
                items.insert(item.id.clone(), item.clone());
                Ok(TodoOutput::Item(item))
            }
            TodoOperation::Update {
                id,
                change,
                condition,
            } => {
                let mut items = self.items.write().await;
                match items.get_mut(&id) {
                    Some(todo) if condition.holds(Some(&*todo)) => {
                        change.apply(todo);
                        Ok(TodoOutput::Item(todo.clone()))
                    }
                    _ => Err(TodoStorageError::ConditionFailed),
                }
            }
            TodoOperation::Delete { id, condition } => {
                let mut items = self.items.write().await;
                if !condition.holds(items.get(&id)) {
                    return Err(TodoStorageError::ConditionFailed);
                }
                items
                    .remove(&id)
                    .map(TodoOutput::Item)
                    .ok_or(TodoStorageError::ConditionFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::todo::{TodoChange, WriteCondition};

    fn put(id: &str, username: &str) -> TodoOperation {
        TodoOperation::Put {
            item: Todo {
                id: id.to_string(),
                username: username.to_string(),
                content: format!("task {id}"),
                status: false,
            },
            condition: WriteCondition::ItemAbsent,
        }
    }

    #[tokio::test]
    async fn test_put_then_query_by_owner() {
        let store = InMemoryTodoStore::new();
        store.execute(put("1", "alice")).await.unwrap();
        store.execute(put("2", "bob")).await.unwrap();

        let todos = store
            .execute(TodoOperation::QueryByOwner {
                username: "alice".to_string(),
            })
            .await
            .unwrap()
            .into_items()
            .unwrap();

        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, "1");
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let store = InMemoryTodoStore::new();
        store.execute(put("1", "alice")).await.unwrap();

        let result = store.execute(put("1", "bob")).await;

        assert!(matches!(result, Err(TodoStorageError::ConditionFailed)));
        assert_eq!(store.get("1").await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_concurrent_puts_with_same_id() {
        let store = Arc::new(InMemoryTodoStore::new());

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.execute(put("same", "alice")).await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.execute(put("same", "bob")).await }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(TodoStorageError::ConditionFailed)))
            .count();

        assert_eq!((successes, conflicts), (1, 1));
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let store = InMemoryTodoStore::new();
        store.execute(put("1", "alice")).await.unwrap();

        let result = store
            .execute(TodoOperation::Update {
                id: "1".to_string(),
                change: TodoChange::Content("hijacked".to_string()),
                condition: WriteCondition::OwnedBy("bob".to_string()),
            })
            .await;

        assert!(matches!(result, Err(TodoStorageError::ConditionFailed)));
        assert_eq!(store.get("1").await.unwrap().content, "task 1");
    }

    #[tokio::test]
    async fn test_update_missing_item_fails_condition() {
        let store = InMemoryTodoStore::new();

        let result = store
            .execute(TodoOperation::Update {
                id: "missing".to_string(),
                change: TodoChange::Status(true),
                condition: WriteCondition::OwnedBy("alice".to_string()),
            })
            .await;

        assert!(matches!(result, Err(TodoStorageError::ConditionFailed)));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_item() {
        let store = InMemoryTodoStore::new();
        store.execute(put("1", "alice")).await.unwrap();

        let deleted = store
            .execute(TodoOperation::Delete {
                id: "1".to_string(),
                condition: WriteCondition::OwnedBy("alice".to_string()),
            })
            .await
            .unwrap()
            .into_item()
            .unwrap();

        assert_eq!(deleted.id, "1");
        assert!(store.get("1").await.is_none());
    }
}
