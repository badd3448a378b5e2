//! Storage adapters
//!
//! One capability set, three backends: the HTTP API, process memory and a
//! JSON snapshot on disk. Stores pick one at construction time.

mod dataset;
mod local;
mod memory;
mod rest;

use std::path::Path;

use async_trait::async_trait;

use notetree_domain::{
    Category, CategoryDetail, CategoryWithChildren, CreateCategoryRequest, CreateTodoRequest, Todo,
    TodoQuery, UpdateCategoryRequest, UpdateTodoRequest,
};

use crate::error::ClientResult;

pub use dataset::Dataset;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use rest::RestStorage;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Full category tree with todo counts
    async fn category_tree(&self) -> ClientResult<Vec<CategoryWithChildren>>;

    /// Every category, name ascending
    async fn list_categories(&self) -> ClientResult<Vec<Category>>;

    async fn get_category(&self, id: &str) -> ClientResult<Option<CategoryDetail>>;

    async fn create_category(&self, req: &CreateCategoryRequest) -> ClientResult<Category>;

    async fn update_category(&self, id: &str, req: &UpdateCategoryRequest) -> ClientResult<Category>;

    /// Removes the category, its descendants and all of their todos
    async fn delete_category(&self, id: &str) -> ClientResult<()>;

    async fn list_todos(&self, query: &TodoQuery) -> ClientResult<Vec<Todo>>;

    async fn get_todo(&self, id: &str) -> ClientResult<Option<Todo>>;

    async fn create_todo(&self, req: &CreateTodoRequest) -> ClientResult<Todo>;

    async fn update_todo(&self, id: &str, req: &UpdateTodoRequest) -> ClientResult<Todo>;

    async fn delete_todo(&self, id: &str) -> ClientResult<()>;

    /// Delete every todo, or only those directly in `category_id`
    async fn delete_all_todos(&self, category_id: Option<&str>) -> ClientResult<()>;
}

/// Replace the file at `path` through a sibling temp file and a rename
pub(crate) async fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
