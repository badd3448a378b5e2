//! Local file storage
//!
//! The whole dataset lives in one JSON file. Every mutation runs against a
//! copy and is only kept once the new snapshot is on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use notetree_domain::{
    Category, CategoryDetail, CategoryWithChildren, CreateCategoryRequest, CreateTodoRequest,
    DomainError, DomainResult, Todo, TodoQuery, UpdateCategoryRequest, UpdateTodoRequest,
};

use super::{new_id, now_millis, write_replacing, Dataset, Storage};
use crate::error::{ClientError, ClientResult};

pub struct LocalStorage {
    path: PathBuf,
    data: Mutex<Dataset>,
}

impl LocalStorage {
    /// Open the snapshot at `path`, starting empty when the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ClientError::Decode(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "starting with an empty local store");
                Dataset::default()
            }
            Err(e) => {
                return Err(DomainError::Internal(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))
                .into())
            }
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Apply `change` to a copy, persist it, then publish it
    async fn mutate<T, F>(&self, change: F) -> ClientResult<T>
    where
        F: FnOnce(&mut Dataset) -> DomainResult<T> + Send,
        T: Send,
    {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let out = change(&mut next)?;
        persist(&self.path, &next).await?;
        *data = next;
        Ok(out)
    }
}

async fn persist(path: &Path, data: &Dataset) -> ClientResult<()> {
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| DomainError::Internal(format!("Failed to encode snapshot: {}", e)))?;

    write_replacing(path, &bytes)
        .await
        .map_err(|e| DomainError::Internal(format!("Failed to write {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

#[async_trait]
impl Storage for LocalStorage {
    async fn category_tree(&self) -> ClientResult<Vec<CategoryWithChildren>> {
        Ok(self.data.lock().await.category_tree())
    }

    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        Ok(self.data.lock().await.list_categories())
    }

    async fn get_category(&self, id: &str) -> ClientResult<Option<CategoryDetail>> {
        Ok(self.data.lock().await.category_detail(id))
    }

    async fn create_category(&self, req: &CreateCategoryRequest) -> ClientResult<Category> {
        let req = req.clone();
        self.mutate(move |data| data.create_category(req, new_id(), now_millis()))
            .await
    }

    async fn update_category(&self, id: &str, req: &UpdateCategoryRequest) -> ClientResult<Category> {
        let req = req.clone();
        self.mutate(move |data| data.update_category(id, req, now_millis()))
            .await
    }

    async fn delete_category(&self, id: &str) -> ClientResult<()> {
        self.mutate(|data| data.delete_category(id).map(|_| ())).await
    }

    async fn list_todos(&self, query: &TodoQuery) -> ClientResult<Vec<Todo>> {
        Ok(self.data.lock().await.list_todos(query))
    }

    async fn get_todo(&self, id: &str) -> ClientResult<Option<Todo>> {
        Ok(self.data.lock().await.get_todo(id))
    }

    async fn create_todo(&self, req: &CreateTodoRequest) -> ClientResult<Todo> {
        let req = req.clone();
        self.mutate(move |data| data.create_todo(req, new_id(), now_millis()))
            .await
    }

    async fn update_todo(&self, id: &str, req: &UpdateTodoRequest) -> ClientResult<Todo> {
        let req = req.clone();
        self.mutate(move |data| data.update_todo(id, req, now_millis()))
            .await
    }

    async fn delete_todo(&self, id: &str) -> ClientResult<()> {
        self.mutate(|data| data.delete_todo(id)).await
    }

    async fn delete_all_todos(&self, category_id: Option<&str>) -> ClientResult<()> {
        self.mutate(|data| data.delete_all_todos(category_id))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");

        let storage = LocalStorage::open(&path).await.unwrap();
        let work = storage
            .create_category(&CreateCategoryRequest {
                name: "Work".into(),
                parent_id: None,
            })
            .await
            .unwrap();
        storage
            .create_todo(&CreateTodoRequest {
                category_id: work.id.clone(),
                title: "Ship v1".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        drop(storage);

        let reopened = LocalStorage::open(&path).await.unwrap();
        assert_eq!(reopened.list_categories().await.unwrap(), vec![work.clone()]);
        let todos = reopened.list_todos(&TodoQuery::in_category(&work.id)).await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Ship v1");
    }

    #[tokio::test]
    async fn test_rejected_mutation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");

        let storage = LocalStorage::open(&path).await.unwrap();
        let err = storage
            .create_category(&CreateCategoryRequest {
                name: "   ".into(),
                parent_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Domain(DomainError::Validation(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LocalStorage::open(&path).await.err().unwrap();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
