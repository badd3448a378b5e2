use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use notetree_domain::{
    CreateTodoRequest, DomainError, Todo, TodoPatch, TodoQuery, TodoSort, UpdateTodoRequest,
};

use super::FetchState;
use crate::error::{ClientError, ClientResult};
use crate::inflight::InFlight;
use crate::storage::Storage;

/// Which todos of the loaded list are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl CompletionFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            CompletionFilter::All => true,
            CompletionFilter::Active => !todo.completed,
            CompletionFilter::Completed => todo.completed,
        }
    }
}

#[derive(Debug, Default)]
struct TodoState {
    todos: FetchState<Vec<Todo>>,
    query: TodoQuery,
    filter: CompletionFilter,
    selected: Option<String>,
    /// What the detail view shows; may run ahead of the list during an update
    detail: Option<Todo>,
}

/// Todo list scoped to one category (or all), selection and detail view
pub struct TodoStore {
    storage: Arc<dyn Storage>,
    state: Mutex<TodoState>,
    inflight: InFlight,
}

impl TodoStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            state: Mutex::new(TodoState::default()),
            inflight: InFlight::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, TodoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn todos(&self) -> FetchState<Vec<Todo>> {
        self.state().todos.clone()
    }

    /// Loaded todos passing the completion filter
    pub fn visible_todos(&self) -> Vec<Todo> {
        let state = self.state();
        state
            .todos
            .data()
            .map(|todos| {
                todos
                    .iter()
                    .filter(|t| state.filter.matches(t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn category_id(&self) -> Option<String> {
        self.state().query.category_id.clone()
    }

    pub fn sort(&self) -> TodoSort {
        self.state().query.sort
    }

    pub fn filter(&self) -> CompletionFilter {
        self.state().filter
    }

    pub fn set_filter(&self, filter: CompletionFilter) {
        self.state().filter = filter;
    }

    pub fn selected(&self) -> Option<String> {
        self.state().selected.clone()
    }

    pub fn detail(&self) -> Option<Todo> {
        self.state().detail.clone()
    }

    /// Whether an update of `id` is still waiting on storage
    pub fn is_saving(&self, id: &str) -> bool {
        self.inflight.is_pending(&format!("todo:update:{id}"))
    }

    /// Select a todo from the loaded list and show it in the detail view
    pub fn select(&self, id: Option<&str>) {
        let mut state = self.state();
        let detail = id.and_then(|id| {
            state
                .todos
                .data()
                .and_then(|todos| todos.iter().find(|t| t.id == id).cloned())
        });
        state.selected = id.map(str::to_string);
        state.detail = detail;
    }

    /// Show the todos of `category_id` (all todos with `None`)
    pub async fn show_category(&self, category_id: Option<&str>) -> ClientResult<()> {
        {
            let mut state = self.state();
            state.query.category_id = category_id.map(str::to_string);
            state.selected = None;
            state.detail = None;
        }
        self.refresh().await
    }

    pub async fn set_sort(&self, sort: TodoSort) -> ClientResult<()> {
        self.state().query.sort = sort;
        self.refresh().await
    }

    pub async fn refresh(&self) -> ClientResult<()> {
        let query = {
            let mut state = self.state();
            state.todos = FetchState::Loading;
            state.query.clone()
        };

        match self.storage.list_todos(&query).await {
            Ok(todos) => {
                let mut state = self.state();
                // A scope change while loading makes this answer stale
                if state.query != query {
                    return Ok(());
                }
                let selected_gone = state
                    .selected
                    .as_ref()
                    .is_some_and(|id| !todos.iter().any(|t| &t.id == id));
                if selected_gone {
                    state.selected = None;
                    state.detail = None;
                }
                state.todos = FetchState::Ready(todos);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load todos");
                self.state().todos = FetchState::Error(err.to_string());
                Err(err)
            }
        }
    }

    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            debug!(error = %err, "reload after mutation failed");
        }
    }

    pub async fn create(&self, req: CreateTodoRequest) -> ClientResult<Todo> {
        let _guard = self
            .inflight
            .begin(format!("todo:create:{}:{}", req.category_id, req.title.trim()))?;
        let todo = self.storage.create_todo(&req).await?;
        self.refresh_after_mutation().await;
        Ok(todo)
    }

    /// Update a todo
    ///
    /// The detail view shows the patched todo at once, then the stored
    /// version on success or the previous one on failure.
    pub async fn update(&self, id: &str, req: UpdateTodoRequest) -> ClientResult<Todo> {
        let _guard = self.inflight.begin(format!("todo:update:{id}"))?;
        let patch = TodoPatch::from_request(req.clone())?;

        let previous = {
            let mut state = self.state();
            match state.detail.as_mut().filter(|d| d.id == id) {
                Some(detail) => {
                    let previous = detail.clone();
                    patch.apply(detail, chrono::Utc::now().timestamp_millis());
                    Some(previous)
                }
                None => None,
            }
        };

        let result = self.storage.update_todo(id, &req).await;
        {
            let mut state = self.state();
            if state.selected.as_deref() == Some(id) {
                match &result {
                    Ok(todo) => state.detail = Some(todo.clone()),
                    Err(_) => {
                        if let Some(previous) = previous {
                            state.detail = Some(previous);
                        }
                    }
                }
            }
        }

        let todo = result?;
        self.refresh_after_mutation().await;
        Ok(todo)
    }

    /// Flip `completed` of a loaded todo
    pub async fn toggle(&self, id: &str) -> ClientResult<Todo> {
        let completed = {
            let state = self.state();
            state
                .todos
                .data()
                .and_then(|todos| todos.iter().find(|t| t.id == id))
                .map(|t| t.completed)
        };
        let completed =
            completed.ok_or_else(|| ClientError::from(DomainError::not_found("Todo not found")))?;
        self.update(id, UpdateTodoRequest::completed(!completed)).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let _guard = self.inflight.begin(format!("todo:delete:{id}"))?;
        self.storage.delete_todo(id).await?;
        {
            let mut state = self.state();
            if state.selected.as_deref() == Some(id) {
                state.selected = None;
                state.detail = None;
            }
        }
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Delete every completed todo of the loaded list
    ///
    /// Keeps going past failures and reports the first one after the reload.
    pub async fn clear_completed(&self) -> ClientResult<usize> {
        let _guard = self.inflight.begin("todo:clear-completed")?;
        let ids: Vec<String> = {
            let state = self.state();
            state
                .todos
                .data()
                .map(|todos| {
                    todos
                        .iter()
                        .filter(|t| t.completed)
                        .map(|t| t.id.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut deleted = 0;
        let mut first_error = None;
        for id in &ids {
            match self.storage.delete_todo(id).await {
                Ok(()) => deleted += 1,
                Err(err) => {
                    warn!(%id, error = %err, "failed to delete completed todo");
                    first_error.get_or_insert(err);
                }
            }
        }

        self.refresh_after_mutation().await;
        match first_error {
            Some(err) => Err(err),
            None => Ok(deleted),
        }
    }

    /// Delete every todo in the current scope
    pub async fn delete_all(&self) -> ClientResult<()> {
        let _guard = self.inflight.begin("todo:delete-all")?;
        let category_id = self.category_id();
        self.storage.delete_all_todos(category_id.as_deref()).await?;
        self.refresh_after_mutation().await;
        Ok(())
    }
}
