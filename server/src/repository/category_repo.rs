//! Category Repository
//!
//! SQLite-backed implementation of the category store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use notetree_domain::{
    Category, CategoryDetail, CategoryPatch, DomainError, DomainResult, NewCategory,
};

use super::now_millis;
use super::traits::{CategoryOperations, Repository};

const CATEGORY_COLUMNS: &str = "id, name, parent_id, created_at, updated_at";

/// The category and every category whose parent chain reaches it.
/// `UNION` (not `UNION ALL`) keeps a corrupted cyclic graph finite.
const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS (
        SELECT ?1
        UNION
        SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
    )";

/// SQLite implementation of the category store
pub struct CategoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CategoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Repository<Category> for CategoryRepository {
    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Category>> {
        let conn = self.conn.lock().await;
        find_category(&conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Category>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC, created_at ASC, rowid ASC"
            ))
            .map_err(DomainError::internal)?;
        let rows = stmt
            .query_map([], row_to_category)
            .map_err(DomainError::internal)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(DomainError::internal)
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(DomainError::internal)?;

        if !category_exists(&tx, id)? {
            return Err(DomainError::not_found("Category not found"));
        }

        // Manual cascade: todos of the whole subtree, then the categories.
        // Both statements commit together or not at all.
        let todos = tx
            .execute(
                &format!("{SUBTREE_CTE} DELETE FROM todos WHERE category_id IN (SELECT id FROM subtree)"),
                params![id],
            )
            .map_err(DomainError::internal)?;
        let categories = tx
            .execute(
                &format!("{SUBTREE_CTE} DELETE FROM categories WHERE id IN (SELECT id FROM subtree)"),
                params![id],
            )
            .map_err(DomainError::internal)?;

        tx.commit().map_err(DomainError::internal)?;
        debug!(%id, categories, todos, "category subtree deleted");
        Ok(())
    }
}

#[async_trait]
impl CategoryOperations for CategoryRepository {
    async fn create(&self, input: NewCategory) -> DomainResult<Category> {
        let conn = self.conn.lock().await;

        if let Some(parent_id) = &input.parent_id {
            if !category_exists(&conn, parent_id)? {
                return Err(DomainError::InvalidReference(
                    "Parent category not found".to_string(),
                ));
            }
        }

        let now = now_millis();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO categories (id, name, parent_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.id,
                category.name,
                category.parent_id,
                category.created_at,
                category.updated_at
            ],
        )
        .map_err(DomainError::internal)?;

        Ok(category)
    }

    async fn update(&self, id: &str, patch: CategoryPatch) -> DomainResult<Category> {
        let conn = self.conn.lock().await;

        let mut category = find_category(&conn, id)?
            .ok_or_else(|| DomainError::not_found("Category not found"))?;

        if let Some(parent_id) = patch.new_parent() {
            if !category_exists(&conn, parent_id)? {
                return Err(DomainError::InvalidReference(
                    "Parent category not found".to_string(),
                ));
            }
        }

        patch.apply(&mut category, now_millis());

        let changed = conn
            .execute(
                "UPDATE categories SET name = ?1, parent_id = ?2, updated_at = ?3 WHERE id = ?4",
                params![category.name, category.parent_id, category.updated_at, category.id],
            )
            .map_err(DomainError::internal)?;
        if changed == 0 {
            return Err(DomainError::not_found("Category not found"));
        }

        Ok(category)
    }

    async fn find_detail(&self, id: &str) -> DomainResult<Option<CategoryDetail>> {
        let conn = self.conn.lock().await;

        conn.query_row(
            &format!(
                "SELECT {CATEGORY_COLUMNS},
                    (SELECT COUNT(*) FROM todos t WHERE t.category_id = cat.id),
                    (SELECT COUNT(*) FROM categories c WHERE c.parent_id = cat.id)
                 FROM categories cat WHERE cat.id = ?1"
            ),
            params![id],
            |row| {
                Ok(CategoryDetail {
                    category: row_to_category(row)?,
                    todo_count: row.get(5)?,
                    children_count: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(DomainError::internal)
    }

    async fn todo_counts(&self) -> DomainResult<HashMap<String, u32>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare("SELECT category_id, COUNT(*) FROM todos GROUP BY category_id")
            .map_err(DomainError::internal)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))
            .map_err(DomainError::internal)?;
        rows.collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(DomainError::internal)
    }
}

pub(super) fn category_exists(conn: &Connection, id: &str) -> DomainResult<bool> {
    conn.query_row(
        "SELECT 1 FROM categories WHERE id = ?1",
        params![id],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(DomainError::internal)
}

fn find_category(conn: &Connection, id: &str) -> DomainResult<Option<Category>> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
        params![id],
        row_to_category,
    )
    .optional()
    .map_err(DomainError::internal)
}

/// Convert a database row to Category
fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
