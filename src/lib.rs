//! Notetree Client
//!
//! Layered architecture:
//! - storage: Backends behind one async trait (REST, local JSON file, memory)
//! - store: Fetch state, selection and mutations on top of a storage
//! - tree / expanded: Category tree display helpers

pub mod config;
pub mod error;
pub mod expanded;
pub mod inflight;
pub mod storage;
pub mod store;
pub mod tree;

pub use config::RestConfig;
pub use error::{ClientError, ClientResult};
pub use expanded::ExpandedState;
pub use storage::{Dataset, LocalStorage, MemoryStorage, RestStorage, Storage};
pub use store::{AppStore, CategoryStore, CompletionFilter, FetchState, TodoStore};
pub use tree::{visible_rows, TreeRow};

pub use notetree_domain as domain;
