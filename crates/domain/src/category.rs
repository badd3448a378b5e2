//! Category Entity
//!
//! Categories form a single-parent tree that groups todos.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

/// A node of the category tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Parent category ID (None = root level)
    pub parent_id: Option<String>,
    /// Unix timestamp (ms)
    pub created_at: i64,
    /// Unix timestamp (ms)
    pub updated_at: i64,
}

impl Category {
    /// Check if this is a root category (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for Category {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A category with its computed subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithChildren {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryWithChildren>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_count: Option<u32>,
}

impl CategoryWithChildren {
    pub fn leaf(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
            todo_count: None,
        }
    }
}

/// Single-category view with direct counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub todo_count: u32,
    pub children_count: u32,
}

// ========================
// Request DTOs
// ========================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absent = unchanged, `null` = move to root
    #[serde(
        default,
        deserialize_with = "crate::serde_ext::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<String>>,
}

// ========================
// Validated Inputs
// ========================

/// A create request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<String>,
}

impl NewCategory {
    pub fn from_request(req: CreateCategoryRequest) -> DomainResult<Self> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation(
                "Name is required and must be a non-empty string",
            ));
        }
        Ok(Self {
            name: name.to_string(),
            parent_id: normalize_parent(req.parent_id),
        })
    }
}

/// An update request that passed validation
///
/// Existence of the category and of the new parent are store concerns and
/// are checked there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub parent_id: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn from_request(id: &str, req: UpdateCategoryRequest) -> DomainResult<Self> {
        let name = match req.name {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation("Name must be a non-empty string"));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let parent_id = req.parent_id.map(normalize_parent);
        if let Some(Some(pid)) = &parent_id {
            if pid == id {
                return Err(DomainError::SelfParent(
                    "Category cannot be its own parent".to_string(),
                ));
            }
        }

        if name.is_none() && parent_id.is_none() {
            return Err(DomainError::NoOp("No fields to update".to_string()));
        }

        Ok(Self { name, parent_id })
    }

    /// The new parent, when the patch moves the category under another one
    pub fn new_parent(&self) -> Option<&str> {
        self.parent_id.as_ref().and_then(|p| p.as_deref())
    }

    pub fn apply(&self, category: &mut Category, now: i64) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(parent_id) = &self.parent_id {
            category.parent_id = parent_id.clone();
        }
        category.updated_at = now;
    }
}

/// Empty or whitespace parent ids mean "root"
fn normalize_parent(parent_id: Option<String>) -> Option<String> {
    parent_id.filter(|p| !p.trim().is_empty())
}
