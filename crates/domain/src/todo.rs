//! Todo Entity
//!
//! A rich-text note with a completion flag, filed under exactly one category.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub category_id: String,
    pub title: String,
    /// Rich-text body (HTML produced by the editor)
    pub content: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Unix timestamp (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Todo {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// List ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TodoSort {
    /// Newest first by creation time
    #[default]
    Created,
    /// Most recently edited first
    Updated,
}

impl TodoSort {
    fn key(&self, todo: &Todo) -> i64 {
        match self {
            TodoSort::Created => todo.created_at,
            TodoSort::Updated => todo.updated_at,
        }
    }
}

/// Filter + ordering for todo listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub sort: TodoSort,
}

impl TodoQuery {
    pub fn in_category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            sort: TodoSort::Created,
        }
    }

    /// Category to filter by; a blank id filters nothing
    pub fn category_filter(&self) -> Option<&str> {
        self.category_id.as_deref().filter(|cid| !cid.trim().is_empty())
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.category_filter()
            .map_or(true, |cid| todo.category_id == cid)
    }
}

/// Check the scope of a bulk todo delete
///
/// `None` deletes every todo. A blank category id is rejected rather than
/// widened to every todo.
pub fn delete_scope(category_id: Option<&str>) -> DomainResult<Option<&str>> {
    match category_id {
        Some(cid) if cid.trim().is_empty() => Err(DomainError::validation(
            "categoryId must be a non-empty string",
        )),
        other => Ok(other),
    }
}

/// Sort todos given in insertion order, newest first
///
/// Equal timestamps keep reverse insertion order, matching the SQL stores.
pub fn sort_todos(todos: &mut Vec<Todo>, sort: TodoSort) {
    todos.reverse();
    todos.sort_by(|a, b| sort.key(b).cmp(&sort.key(a)));
}

// ========================
// Request DTOs
// ========================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
}

/// Partial update; only supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// `null` clears the author
    #[serde(
        default,
        deserialize_with = "crate::serde_ext::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<Option<String>>,
    /// `null` clears the publish date
    #[serde(
        default,
        deserialize_with = "crate::serde_ext::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<Option<i64>>,
}

impl UpdateTodoRequest {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

// ========================
// Validated Inputs
// ========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub category_id: String,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub published_at: Option<i64>,
}

impl NewTodo {
    pub fn from_request(req: CreateTodoRequest) -> DomainResult<Self> {
        if req.category_id.trim().is_empty() {
            return Err(DomainError::validation("categoryId is required"));
        }
        let title = req.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation(
                "Title is required and must be a non-empty string",
            ));
        }
        Ok(Self {
            category_id: req.category_id,
            title: title.to_string(),
            content: req.content.unwrap_or_default(),
            author: normalize_author(req.author),
            published_at: req.published_at,
        })
    }

    pub fn into_todo(self, id: String, now: i64) -> Todo {
        Todo {
            id,
            category_id: self.category_id,
            title: self.title,
            content: self.content,
            completed: false,
            author: self.author,
            published_at: self.published_at,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub completed: Option<bool>,
    pub author: Option<Option<String>>,
    pub published_at: Option<Option<i64>>,
}

impl TodoPatch {
    pub fn from_request(req: UpdateTodoRequest) -> DomainResult<Self> {
        let category_id = match req.category_id {
            Some(cid) if cid.trim().is_empty() => {
                return Err(DomainError::validation(
                    "categoryId must be a non-empty string",
                ));
            }
            other => other,
        };
        let title = match req.title {
            Some(title) => {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation("Title must be a non-empty string"));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let patch = Self {
            category_id,
            title,
            content: req.content,
            completed: req.completed,
            author: req.author.map(normalize_author),
            published_at: req.published_at,
        };
        if patch.is_empty() {
            return Err(DomainError::NoOp("No fields to update".to_string()));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.completed.is_none()
            && self.author.is_none()
            && self.published_at.is_none()
    }

    pub fn apply(&self, todo: &mut Todo, now: i64) {
        if let Some(cid) = &self.category_id {
            todo.category_id = cid.clone();
        }
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(content) = &self.content {
            todo.content = content.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(author) = &self.author {
            todo.author = author.clone();
        }
        if let Some(published_at) = self.published_at {
            todo.published_at = published_at;
        }
        todo.updated_at = now;
    }
}

fn normalize_author(author: Option<String>) -> Option<String> {
    author.filter(|a| !a.trim().is_empty())
}
