//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod category_repo;
mod todo_repo;

#[cfg(test)]
mod tests;

pub use traits::{CategoryOperations, Repository, TodoOperations};
pub use db::{init_db, DbState};
pub use category_repo::CategoryRepository;
pub use todo_repo::TodoRepository;

/// Current time as Unix epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
