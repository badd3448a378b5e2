//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! The HTTP layer only sees these traits, so the backing store can be
//! swapped at construction time.

use std::collections::HashMap;

use async_trait::async_trait;
use notetree_domain::{
    apply_todo_counts, build_tree, Category, CategoryDetail, CategoryPatch, CategoryWithChildren,
    DomainResult, Entity, NewCategory, NewTodo, Todo, TodoPatch, TodoQuery,
};

/// Core repository trait shared by every entity store
///
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: &T::Id) -> DomainResult<Option<T>>;

    /// List all entities in the store's natural order
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Delete entity by ID, failing with `NotFound` when it is absent
    async fn delete(&self, id: &T::Id) -> DomainResult<()>;
}

/// Category store
///
/// `delete` cascades to descendant categories and their todos atomically.
#[async_trait]
pub trait CategoryOperations: Repository<Category> {
    async fn create(&self, input: NewCategory) -> DomainResult<Category>;

    async fn update(&self, id: &str, patch: CategoryPatch) -> DomainResult<Category>;

    /// Category plus direct todo and child counts
    async fn find_detail(&self, id: &str) -> DomainResult<Option<CategoryDetail>>;

    /// Number of todos filed directly under each category
    async fn todo_counts(&self) -> DomainResult<HashMap<String, u32>>;

    /// The whole tree with todo counts at every level
    async fn tree(&self) -> DomainResult<Vec<CategoryWithChildren>> {
        let categories = self.list().await?;
        let counts = self.todo_counts().await?;
        let mut tree = build_tree(&categories, None);
        apply_todo_counts(&mut tree, &counts);
        Ok(tree)
    }
}

/// Todo store
#[async_trait]
pub trait TodoOperations: Repository<Todo> {
    async fn list_by(&self, query: &TodoQuery) -> DomainResult<Vec<Todo>>;

    async fn create(&self, input: NewTodo) -> DomainResult<Todo>;

    async fn update(&self, id: &str, patch: TodoPatch) -> DomainResult<Todo>;

    /// Delete every todo, or only those directly in `category_id`
    ///
    /// Returns the number of deleted rows.
    async fn delete_all(&self, category_id: Option<&str>) -> DomainResult<usize>;
}
