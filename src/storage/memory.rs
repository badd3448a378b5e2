use async_trait::async_trait;
use tokio::sync::Mutex;

use notetree_domain::{
    Category, CategoryDetail, CategoryWithChildren, CreateCategoryRequest, CreateTodoRequest, Todo,
    TodoQuery, UpdateCategoryRequest, UpdateTodoRequest,
};

use super::{new_id, now_millis, Dataset, Storage};
use crate::error::ClientResult;

/// Process-local storage, gone when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<Dataset>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
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
        let mut data = self.data.lock().await;
        Ok(data.create_category(req.clone(), new_id(), now_millis())?)
    }

    async fn update_category(&self, id: &str, req: &UpdateCategoryRequest) -> ClientResult<Category> {
        let mut data = self.data.lock().await;
        Ok(data.update_category(id, req.clone(), now_millis())?)
    }

    async fn delete_category(&self, id: &str) -> ClientResult<()> {
        let mut data = self.data.lock().await;
        data.delete_category(id)?;
        Ok(())
    }

    async fn list_todos(&self, query: &TodoQuery) -> ClientResult<Vec<Todo>> {
        Ok(self.data.lock().await.list_todos(query))
    }

    async fn get_todo(&self, id: &str) -> ClientResult<Option<Todo>> {
        Ok(self.data.lock().await.get_todo(id))
    }

    async fn create_todo(&self, req: &CreateTodoRequest) -> ClientResult<Todo> {
        let mut data = self.data.lock().await;
        Ok(data.create_todo(req.clone(), new_id(), now_millis())?)
    }

    async fn update_todo(&self, id: &str, req: &UpdateTodoRequest) -> ClientResult<Todo> {
        let mut data = self.data.lock().await;
        Ok(data.update_todo(id, req.clone(), now_millis())?)
    }

    async fn delete_todo(&self, id: &str) -> ClientResult<()> {
        let mut data = self.data.lock().await;
        Ok(data.delete_todo(id)?)
    }

    async fn delete_all_todos(&self, category_id: Option<&str>) -> ClientResult<()> {
        self.data.lock().await.delete_all_todos(category_id)?;
        Ok(())
    }
}
