//! Todo Repository
//!
//! SQLite-backed implementation of the todo store.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use notetree_domain::{DomainError, DomainResult, NewTodo, Todo, TodoPatch, TodoQuery, TodoSort};

use super::category_repo::category_exists;
use super::now_millis;
use super::traits::{Repository, TodoOperations};

const TODO_COLUMNS: &str =
    "id, category_id, title, content, completed, author, published_at, created_at, updated_at";

/// SQLite implementation of the todo store
pub struct TodoRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TodoRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Repository<Todo> for TodoRepository {
    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Todo>> {
        let conn = self.conn.lock().await;
        find_todo(&conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Todo>> {
        self.list_by(&TodoQuery::default()).await
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let deleted = conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .map_err(DomainError::internal)?;
        if deleted == 0 {
            return Err(DomainError::not_found("Todo not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoOperations for TodoRepository {
    async fn list_by(&self, query: &TodoQuery) -> DomainResult<Vec<Todo>> {
        let conn = self.conn.lock().await;

        let order_column = match query.sort {
            TodoSort::Created => "created_at",
            TodoSort::Updated => "updated_at",
        };
        // rowid breaks ties between rows written in the same millisecond
        let order = format!("ORDER BY {order_column} DESC, rowid DESC");

        let todos = match query.category_filter() {
            Some(category_id) => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {TODO_COLUMNS} FROM todos WHERE category_id = ?1 {order}"
                    ))
                    .map_err(DomainError::internal)?;
                let rows = stmt
                    .query_map(params![category_id], row_to_todo)
                    .map_err(DomainError::internal)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!("SELECT {TODO_COLUMNS} FROM todos {order}"))
                    .map_err(DomainError::internal)?;
                let rows = stmt
                    .query_map([], row_to_todo)
                    .map_err(DomainError::internal)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
        };
        todos.map_err(DomainError::internal)
    }

    async fn create(&self, input: NewTodo) -> DomainResult<Todo> {
        let conn = self.conn.lock().await;

        if !category_exists(&conn, &input.category_id)? {
            return Err(DomainError::InvalidReference("Category not found".to_string()));
        }

        let todo = input.into_todo(Uuid::new_v4().to_string(), now_millis());
        conn.execute(
            &format!("INSERT INTO todos ({TODO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                todo.id,
                todo.category_id,
                todo.title,
                todo.content,
                todo.completed,
                todo.author,
                todo.published_at,
                todo.created_at,
                todo.updated_at
            ],
        )
        .map_err(DomainError::internal)?;

        Ok(todo)
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> DomainResult<Todo> {
        let conn = self.conn.lock().await;

        let mut todo = find_todo(&conn, id)?.ok_or_else(|| DomainError::not_found("Todo not found"))?;

        if let Some(category_id) = &patch.category_id {
            if !category_exists(&conn, category_id)? {
                return Err(DomainError::InvalidReference("Category not found".to_string()));
            }
        }

        patch.apply(&mut todo, now_millis());

        let changed = conn
            .execute(
                "UPDATE todos SET category_id = ?1, title = ?2, content = ?3, completed = ?4, author = ?5, published_at = ?6, updated_at = ?7 WHERE id = ?8",
                params![
                    todo.category_id,
                    todo.title,
                    todo.content,
                    todo.completed,
                    todo.author,
                    todo.published_at,
                    todo.updated_at,
                    todo.id
                ],
            )
            .map_err(DomainError::internal)?;
        if changed == 0 {
            return Err(DomainError::not_found("Todo not found"));
        }

        Ok(todo)
    }

    async fn delete_all(&self, category_id: Option<&str>) -> DomainResult<usize> {
        let conn = self.conn.lock().await;

        let deleted = match category_id {
            Some(cid) => conn.execute("DELETE FROM todos WHERE category_id = ?1", params![cid]),
            None => conn.execute("DELETE FROM todos", []),
        }
        .map_err(DomainError::internal)?;

        debug!(?category_id, deleted, "todos deleted in bulk");
        Ok(deleted)
    }
}

fn find_todo(conn: &Connection, id: &str) -> DomainResult<Option<Todo>> {
    conn.query_row(
        &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
        params![id],
        row_to_todo,
    )
    .optional()
    .map_err(DomainError::internal)
}

/// Convert a database row to Todo
fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        category_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        completed: row.get(4)?,
        author: row.get(5)?,
        published_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
