//! Resolver mapping layer
//!
//! Each API operation maps its arguments and the verified caller identity to exactly
//! one store operation. The mappings are pure: identifiers are generated by the
//! caller of [`create_todo`], and ownership is enforced by the store through the
//! attached [`WriteCondition`], never checked here.

use todo_storage::todo::{Todo, TodoChange, TodoId, TodoOperation, WriteCondition};

use crate::identity::CallerIdentity;

/// Arguments of `createTodo`
#[derive(Debug, Clone)]
pub struct CreateTodoArgs {
    /// Task text
    pub content: String,
}

/// Arguments of `editTodoContent`
#[derive(Debug, Clone)]
pub struct EditTodoContentArgs {
    /// Item to edit
    pub id: String,
    /// Replacement task text
    pub new_content: String,
}

/// Arguments of `toggleTodoStatus`
#[derive(Debug, Clone)]
pub struct ToggleTodoStatusArgs {
    /// Item to update
    pub id: String,
    /// Completion flag to set
    pub new_status: bool,
}

/// Arguments of `deleteTodo`
#[derive(Debug, Clone)]
pub struct DeleteTodoArgs {
    /// Item to delete
    pub id: String,
}

/// `todos`: every item owned by the caller
#[must_use]
pub fn todos(caller: &CallerIdentity) -> TodoOperation {
    TodoOperation::QueryByOwner {
        username: caller.username.clone(),
    }
}

/// `createTodo`: put a new item owned by the caller, never overwriting an existing id
#[must_use]
pub fn create_todo(args: CreateTodoArgs, caller: &CallerIdentity, id: TodoId) -> TodoOperation {
    TodoOperation::Put {
        item: Todo {
            id: id.into(),
            username: caller.username.clone(),
            content: args.content,
            status: false,
        },
        condition: WriteCondition::ItemAbsent,
    }
}

/// `editTodoContent`: replace the content of an item the caller owns
#[must_use]
pub fn edit_todo_content(args: EditTodoContentArgs, caller: &CallerIdentity) -> TodoOperation {
    TodoOperation::Update {
        id: args.id,
        change: TodoChange::Content(args.new_content),
        condition: owned_by(caller),
    }
}

/// `toggleTodoStatus`: set the status of an item the caller owns
///
/// This is a plain set, so repeating a call with the same status succeeds.
#[must_use]
pub fn toggle_todo_status(args: ToggleTodoStatusArgs, caller: &CallerIdentity) -> TodoOperation {
    TodoOperation::Update {
        id: args.id,
        change: TodoChange::Status(args.new_status),
        condition: owned_by(caller),
    }
}

/// `deleteTodo`: delete an item the caller owns
#[must_use]
pub fn delete_todo(args: DeleteTodoArgs, caller: &CallerIdentity) -> TodoOperation {
    TodoOperation::Delete {
        id: args.id,
        condition: owned_by(caller),
    }
}

fn owned_by(caller: &CallerIdentity) -> WriteCondition {
    WriteCondition::OwnedBy(caller.username.clone())
}
