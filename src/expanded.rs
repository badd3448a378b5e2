//! Expand/collapse state of the category tree
//!
//! Stored as a small JSON object `{categoryId: bool}`. Categories without an
//! entry are expanded.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use notetree_domain::{flatten_tree, CategoryWithChildren};

use crate::storage::write_replacing;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedState {
    flags: BTreeMap<String, bool>,
}

impl ExpandedState {
    pub fn is_expanded(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(true)
    }

    pub fn set(&mut self, id: &str, expanded: bool) {
        self.flags.insert(id.to_string(), expanded);
    }

    /// Flip the flag and return the new value
    pub fn toggle(&mut self, id: &str) -> bool {
        let expanded = !self.is_expanded(id);
        self.set(id, expanded);
        expanded
    }

    /// Drop entries for ids not in `known`; returns true when anything was removed
    pub fn prune<'a, I>(&mut self, known: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: HashSet<&str> = known.into_iter().collect();
        let before = self.flags.len();
        self.flags.retain(|id, _| known.contains(id.as_str()));
        self.flags.len() != before
    }

    pub fn prune_to_tree(&mut self, tree: &[CategoryWithChildren]) -> bool {
        let categories = flatten_tree(tree);
        self.prune(categories.iter().map(|c| c.id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Read the blob at `path`; a missing or unreadable blob yields the default
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding unreadable expanded state");
                Self::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read expanded state");
                Self::default()
            }
        }
    }

    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        let bytes = serde_json::to_vec(self)?;
        write_replacing(path, &bytes).await
    }
}
