use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use notetree_domain::{
    flatten_tree, tree::find_in_tree, Category, CategoryWithChildren, CreateCategoryRequest,
    UpdateCategoryRequest,
};

use super::FetchState;
use crate::error::ClientResult;
use crate::expanded::ExpandedState;
use crate::inflight::InFlight;
use crate::storage::Storage;
use crate::tree::{visible_rows, TreeRow};

#[derive(Debug, Default)]
struct CategoryState {
    tree: FetchState<Vec<CategoryWithChildren>>,
    selected: Option<String>,
    expanded: ExpandedState,
}

/// Category tree, selection and expand/collapse state
pub struct CategoryStore {
    storage: Arc<dyn Storage>,
    state: Mutex<CategoryState>,
    inflight: InFlight,
    expanded_path: Option<PathBuf>,
}

impl CategoryStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            state: Mutex::new(CategoryState::default()),
            inflight: InFlight::new(),
            expanded_path: None,
        }
    }

    /// Persist expand/collapse flags at `path`, loading what is already there
    pub fn with_expanded_file(storage: Arc<dyn Storage>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let expanded = ExpandedState::load(&path);
        Self {
            storage,
            state: Mutex::new(CategoryState {
                expanded,
                ..CategoryState::default()
            }),
            inflight: InFlight::new(),
            expanded_path: Some(path),
        }
    }

    fn state(&self) -> MutexGuard<'_, CategoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn save_expanded(&self, expanded: &ExpandedState) {
        if let Some(path) = &self.expanded_path {
            if let Err(e) = expanded.save(path).await {
                warn!(path = %path.display(), error = %e, "failed to save expanded state");
            }
        }
    }

    pub fn tree(&self) -> FetchState<Vec<CategoryWithChildren>> {
        self.state().tree.clone()
    }

    /// Categories in display order, ignoring collapse
    pub fn flat(&self) -> Vec<Category> {
        self.state()
            .tree
            .data()
            .map(|tree| flatten_tree(tree))
            .unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<CategoryWithChildren> {
        let state = self.state();
        state.tree.data().and_then(|tree| find_in_tree(tree, id).cloned())
    }

    pub fn selected(&self) -> Option<String> {
        self.state().selected.clone()
    }

    pub fn select(&self, id: Option<&str>) {
        self.state().selected = id.map(str::to_string);
    }

    /// Refetch the tree
    ///
    /// A selection and expand flags pointing at vanished categories are dropped.
    pub async fn refresh(&self) -> ClientResult<()> {
        self.state().tree = FetchState::Loading;

        match self.storage.category_tree().await {
            Ok(tree) => {
                let pruned = {
                    let mut state = self.state();
                    let selection_gone = state
                        .selected
                        .as_deref()
                        .is_some_and(|id| find_in_tree(&tree, id).is_none());
                    if selection_gone {
                        state.selected = None;
                    }
                    let pruned = state.expanded.prune_to_tree(&tree).then(|| state.expanded.clone());
                    state.tree = FetchState::Ready(tree);
                    pruned
                };
                if let Some(expanded) = pruned {
                    self.save_expanded(&expanded).await;
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load categories");
                self.state().tree = FetchState::Error(err.to_string());
                Err(err)
            }
        }
    }

    /// Refresh after a successful mutation; a failed reload only shows in the fetch state
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            debug!(error = %err, "reload after mutation failed");
        }
    }

    pub async fn create(&self, name: &str, parent_id: Option<&str>) -> ClientResult<Category> {
        let _guard = self.inflight.begin(format!(
            "category:create:{}:{}",
            parent_id.unwrap_or_default(),
            name.trim()
        ))?;
        let req = CreateCategoryRequest {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        };
        let category = self.storage.create_category(&req).await?;
        self.refresh_after_mutation().await;
        Ok(category)
    }

    pub async fn update(&self, id: &str, req: UpdateCategoryRequest) -> ClientResult<Category> {
        let _guard = self.inflight.begin(format!("category:update:{id}"))?;
        let category = self.storage.update_category(id, &req).await?;
        self.refresh_after_mutation().await;
        Ok(category)
    }

    pub async fn rename(&self, id: &str, name: &str) -> ClientResult<Category> {
        self.update(
            id,
            UpdateCategoryRequest {
                name: Some(name.to_string()),
                parent_id: None,
            },
        )
        .await
    }

    /// Move under `parent_id`, or to the root level with `None`
    pub async fn move_to(&self, id: &str, parent_id: Option<&str>) -> ClientResult<Category> {
        self.update(
            id,
            UpdateCategoryRequest {
                name: None,
                parent_id: Some(parent_id.map(str::to_string)),
            },
        )
        .await
    }

    /// Delete with its subtree; clears the selection when it was inside
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let _guard = self.inflight.begin(format!("category:delete:{id}"))?;
        // Selection inside the subtree goes away with it
        let doomed: Vec<String> = self
            .find(id)
            .map(|node| flatten_tree(&[node]).into_iter().map(|c| c.id).collect())
            .unwrap_or_else(|| vec![id.to_string()]);

        self.storage.delete_category(id).await?;
        {
            let mut state = self.state();
            if state.selected.as_ref().is_some_and(|s| doomed.contains(s)) {
                state.selected = None;
            }
        }
        self.refresh_after_mutation().await;
        Ok(())
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.state().expanded.is_expanded(id)
    }

    /// Flip a category open or closed and persist the flags
    pub async fn toggle_expanded(&self, id: &str) -> bool {
        let (expanded, snapshot) = {
            let mut state = self.state();
            let expanded = state.expanded.toggle(id);
            (expanded, state.expanded.clone())
        };
        self.save_expanded(&snapshot).await;
        expanded
    }

    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let state = self.state();
        match state.tree.data() {
            Some(tree) => visible_rows(tree, &state.expanded),
            None => Vec::new(),
        }
    }
}
