//! In-process dataset
//!
//! Shared by the memory and local-file adapters. Validation comes from the
//! domain crate so both behave like the server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use notetree_domain::{
    apply_todo_counts, build_tree, delete_scope, sort_categories, sort_todos, subtree_ids, Category,
    CategoryDetail, CategoryPatch, CategoryWithChildren, CreateCategoryRequest, CreateTodoRequest,
    DomainError, DomainResult, NewCategory, NewTodo, Todo, TodoPatch, TodoQuery,
    UpdateCategoryRequest, UpdateTodoRequest,
};

/// Categories and todos, each kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl Dataset {
    fn category_exists(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    fn todo_counts(&self) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for todo in &self.todos {
            *counts.entry(todo.category_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        sort_categories(&mut categories);
        categories
    }

    pub fn category_tree(&self) -> Vec<CategoryWithChildren> {
        let mut tree = build_tree(&self.list_categories(), None);
        apply_todo_counts(&mut tree, &self.todo_counts());
        tree
    }

    pub fn category_detail(&self, id: &str) -> Option<CategoryDetail> {
        let category = self.categories.iter().find(|c| c.id == id)?;
        Some(CategoryDetail {
            category: category.clone(),
            todo_count: self.todos.iter().filter(|t| t.category_id == id).count() as u32,
            children_count: self
                .categories
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(id))
                .count() as u32,
        })
    }

    pub fn create_category(
        &mut self,
        req: CreateCategoryRequest,
        id: String,
        now: i64,
    ) -> DomainResult<Category> {
        let input = NewCategory::from_request(req)?;
        if let Some(parent_id) = &input.parent_id {
            if !self.category_exists(parent_id) {
                return Err(DomainError::InvalidReference(
                    "Parent category not found".to_string(),
                ));
            }
        }

        let category = Category {
            id,
            name: input.name,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn update_category(
        &mut self,
        id: &str,
        req: UpdateCategoryRequest,
        now: i64,
    ) -> DomainResult<Category> {
        let patch = CategoryPatch::from_request(id, req)?;
        if !self.category_exists(id) {
            return Err(DomainError::not_found("Category not found"));
        }
        if let Some(parent_id) = patch.new_parent() {
            if !self.category_exists(parent_id) {
                return Err(DomainError::InvalidReference(
                    "Parent category not found".to_string(),
                ));
            }
        }

        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("Category not found"))?;
        patch.apply(category, now);
        Ok(category.clone())
    }

    /// Remove the category, its descendants and their todos
    ///
    /// Returns the number of removed categories and todos.
    pub fn delete_category(&mut self, id: &str) -> DomainResult<(usize, usize)> {
        if !self.category_exists(id) {
            return Err(DomainError::not_found("Category not found"));
        }
        let doomed = subtree_ids(&self.categories, id);

        let categories_before = self.categories.len();
        let todos_before = self.todos.len();
        self.todos.retain(|t| !doomed.contains(&t.category_id));
        self.categories.retain(|c| !doomed.contains(&c.id));

        Ok((
            categories_before - self.categories.len(),
            todos_before - self.todos.len(),
        ))
    }

    pub fn list_todos(&self, query: &TodoQuery) -> Vec<Todo> {
        let mut todos: Vec<Todo> = self
            .todos
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        sort_todos(&mut todos, query.sort);
        todos
    }

    pub fn get_todo(&self, id: &str) -> Option<Todo> {
        self.todos.iter().find(|t| t.id == id).cloned()
    }

    pub fn create_todo(&mut self, req: CreateTodoRequest, id: String, now: i64) -> DomainResult<Todo> {
        let input = NewTodo::from_request(req)?;
        if !self.category_exists(&input.category_id) {
            return Err(DomainError::InvalidReference("Category not found".to_string()));
        }

        let todo = input.into_todo(id, now);
        self.todos.push(todo.clone());
        Ok(todo)
    }

    pub fn update_todo(&mut self, id: &str, req: UpdateTodoRequest, now: i64) -> DomainResult<Todo> {
        let patch = TodoPatch::from_request(req)?;
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DomainError::not_found("Todo not found"))?;
        if let Some(category_id) = &patch.category_id {
            if !self.category_exists(category_id) {
                return Err(DomainError::InvalidReference("Category not found".to_string()));
            }
        }

        let todo = &mut self.todos[index];
        patch.apply(todo, now);
        Ok(todo.clone())
    }

    pub fn delete_todo(&mut self, id: &str) -> DomainResult<()> {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        if self.todos.len() == before {
            return Err(DomainError::not_found("Todo not found"));
        }
        Ok(())
    }

    pub fn delete_all_todos(&mut self, category_id: Option<&str>) -> DomainResult<usize> {
        let before = self.todos.len();
        match delete_scope(category_id)? {
            Some(cid) => self.todos.retain(|t| t.category_id != cid),
            None => self.todos.clear(),
        }
        Ok(before - self.todos.len())
    }
}
