//! Domain Layer
//!
//! Contains all domain entities and core abstractions, shared by the
//! server and the client.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod category;
mod todo;
mod serde_ext;
pub mod tree;

pub use entity::{Entity, DomainError, DomainResult};
pub use category::{
    Category, CategoryDetail, CategoryPatch, CategoryWithChildren, CreateCategoryRequest,
    NewCategory, UpdateCategoryRequest,
};
pub use todo::{
    delete_scope, sort_todos, CreateTodoRequest, NewTodo, Todo, TodoPatch, TodoQuery, TodoSort,
    UpdateTodoRequest,
};
pub use tree::{apply_todo_counts, build_tree, flatten_tree, sort_categories, subtree_ids};
