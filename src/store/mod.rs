//! Client State Layer
//!
//! Fetch state per collection plus selection, sitting on top of a
//! `Storage`. Every mutation refetches the affected collection.

mod category;
mod todo;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ClientResult;
use crate::storage::Storage;

pub use category::CategoryStore;
pub use todo::{CompletionFilter, TodoStore};

/// Load state of one collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Category and todo stores sharing one storage backend
pub struct AppStore {
    pub categories: CategoryStore,
    pub todos: TodoStore,
}

impl AppStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            categories: CategoryStore::new(Arc::clone(&storage)),
            todos: TodoStore::new(storage),
        }
    }

    /// Like `new`, with expand/collapse state persisted at `expanded_path`
    pub fn with_expanded_file(storage: Arc<dyn Storage>, expanded_path: impl Into<PathBuf>) -> Self {
        Self {
            categories: CategoryStore::with_expanded_file(Arc::clone(&storage), expanded_path),
            todos: TodoStore::new(storage),
        }
    }

    /// Initial load of the category tree and the unscoped todo list
    pub async fn load(&self) -> ClientResult<()> {
        self.categories.refresh().await?;
        self.todos.refresh().await
    }

    /// Select a category and show its todos
    pub async fn select_category(&self, id: Option<&str>) -> ClientResult<()> {
        self.categories.select(id);
        self.todos.show_category(id).await
    }

    /// Delete a category; the todo list falls back to all todos when the
    /// shown category went away with it
    pub async fn delete_category(&self, id: &str) -> ClientResult<()> {
        self.categories.delete(id).await?;
        let scope_gone = self
            .todos
            .category_id()
            .is_some_and(|shown| self.categories.find(&shown).is_none());
        if scope_gone {
            self.todos.show_category(None).await
        } else {
            self.todos.refresh().await
        }
    }
}
