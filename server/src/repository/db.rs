//! Database Connection and Setup
//!
//! Manages the SQLite connection and schema migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use notetree_domain::{DomainError, DomainResult};

/// Database state wrapper
///
/// Repositories share one connection; each operation holds the lock for its
/// whole read-check-write sequence.
#[derive(Clone)]
pub struct DbState {
    conn: Arc<Mutex<Connection>>,
}

impl DbState {
    /// Get the shared connection handle
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Open (or create) the database at `db_path` and bring the schema up to date
///
/// `:memory:` opens a private in-memory database.
pub fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open {}: {}", db_path.display(), e)))?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| DomainError::Internal(format!("Failed to configure pragmas: {}", e)))?;
    debug!("database pragmas configured");

    run_migrations(&conn)?;
    info!(path = %db_path.display(), "database ready");

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
    })
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(DomainError::internal)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(DomainError::internal)?;
    for name in names {
        if name.map_err(DomainError::internal)? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            parent_id TEXT REFERENCES categories(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(DomainError::internal)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            completed INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(DomainError::internal)?;

    // Article metadata arrived after the first schema
    if !column_exists(conn, "todos", "author")? {
        conn.execute("ALTER TABLE todos ADD COLUMN author TEXT", [])
            .map_err(|e| DomainError::Internal(format!("Failed to add author: {}", e)))?;
    }

    if !column_exists(conn, "todos", "published_at")? {
        conn.execute("ALTER TABLE todos ADD COLUMN published_at INTEGER", [])
            .map_err(|e| DomainError::Internal(format!("Failed to add published_at: {}", e)))?;
    }

    // Indexes for parent-child and category lookups
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);
         CREATE INDEX IF NOT EXISTS idx_todos_category ON todos(category_id);",
    )
    .map_err(DomainError::internal)?;

    Ok(())
}
