//! Tree Utilities
//!
//! Turns the flat category rows into the nested tree the API serves.

use std::collections::{HashMap, HashSet};

use crate::category::{Category, CategoryWithChildren};

/// Order categories the way every listing presents them
///
/// Name ascending, case-sensitive (byte order), stable for equal names.
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Build the nested tree under `root` (None = top level)
///
/// Children keep the relative order of the input slice. Categories whose
/// parent is not in the input (orphans) never appear. A visited set makes
/// every id appear at most once, so a cyclic parent graph or duplicate ids
/// cannot recurse forever.
pub fn build_tree(categories: &[Category], root: Option<&str>) -> Vec<CategoryWithChildren> {
    // Build parent -> children map
    let mut children_map: HashMap<Option<&str>, Vec<&Category>> = HashMap::new();
    for category in categories {
        children_map
            .entry(category.parent_id.as_deref())
            .or_default()
            .push(category);
    }

    fn collect<'a>(
        parent_id: Option<&'a str>,
        children_map: &HashMap<Option<&'a str>, Vec<&'a Category>>,
        visited: &mut HashSet<&'a str>,
    ) -> Vec<CategoryWithChildren> {
        let Some(children) = children_map.get(&parent_id) else {
            return Vec::new();
        };
        let mut nodes = Vec::with_capacity(children.len());
        for category in children {
            if !visited.insert(category.id.as_str()) {
                continue;
            }
            let mut node = CategoryWithChildren::leaf((*category).clone());
            node.children = collect(Some(category.id.as_str()), children_map, visited);
            nodes.push(node);
        }
        nodes
    }

    let mut visited = HashSet::new();
    // The root itself is never its own descendant
    if let Some(root_id) = root {
        visited.insert(root_id);
    }
    collect(root, &children_map, &mut visited)
}

/// Pre-order flattening of a tree back into plain categories
pub fn flatten_tree(tree: &[CategoryWithChildren]) -> Vec<Category> {
    fn walk(nodes: &[CategoryWithChildren], out: &mut Vec<Category>) {
        for node in nodes {
            out.push(node.category.clone());
            walk(&node.children, out);
        }
    }

    let mut result = Vec::new();
    walk(tree, &mut result);
    result
}

/// Fill `todo_count` at every level from a category id -> count map
pub fn apply_todo_counts(tree: &mut [CategoryWithChildren], counts: &HashMap<String, u32>) {
    for node in tree {
        node.todo_count = Some(counts.get(&node.category.id).copied().unwrap_or(0));
        apply_todo_counts(&mut node.children, counts);
    }
}

/// Ids of `root_id` and every category whose parent chain reaches it
pub fn subtree_ids(categories: &[Category], root_id: &str) -> HashSet<String> {
    let mut children_map: HashMap<&str, Vec<&str>> = HashMap::new();
    for category in categories {
        if let Some(parent) = category.parent_id.as_deref() {
            children_map.entry(parent).or_default().push(&category.id);
        }
    }

    let mut result = HashSet::new();
    let mut to_visit = vec![root_id];
    while let Some(current) = to_visit.pop() {
        if !result.insert(current.to_string()) {
            continue;
        }
        if let Some(children) = children_map.get(current) {
            to_visit.extend(children.iter().copied());
        }
    }
    result
}

/// Find a node anywhere in the tree
pub fn find_in_tree<'a>(tree: &'a [CategoryWithChildren], id: &str) -> Option<&'a CategoryWithChildren> {
    for node in tree {
        if node.category.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_tree(&node.children, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_category(id: &str, name: &str, parent_id: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn names(nodes: &[CategoryWithChildren]) -> Vec<&str> {
        nodes.iter().map(|n| n.category.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[], None).is_empty());
    }

    #[test]
    fn test_build_tree() {
        let mut categories = vec![
            make_category("3", "Projects", Some("1")),
            make_category("1", "Work", None),
            make_category("2", "Home", None),
            make_category("4", "Archive", Some("1")),
            make_category("5", "v1", Some("3")),
        ];
        sort_categories(&mut categories);

        let tree = build_tree(&categories, None);

        assert_eq!(names(&tree), ["Home", "Work"]);
        assert_eq!(names(&tree[1].children), ["Archive", "Projects"]);
        assert_eq!(names(&tree[1].children[1].children), ["v1"]);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_orphans_are_excluded() {
        let categories = vec![
            make_category("1", "Work", None),
            make_category("2", "Lost", Some("missing")),
            make_category("3", "Lost child", Some("2")),
        ];
        let flat = flatten_tree(&build_tree(&categories, None));
        let ids: Vec<_> = flat.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1"]);
    }

    #[test]
    fn test_case_sensitive_order() {
        let mut categories = vec![
            make_category("1", "apple", None),
            make_category("2", "Banana", None),
            make_category("3", "Apple", None),
        ];
        sort_categories(&mut categories);
        let tree = build_tree(&categories, None);
        assert_eq!(names(&tree), ["Apple", "Banana", "apple"]);
    }

    #[test]
    fn test_cycle_terminates() {
        // A -> B -> A, plus a healthy root
        let categories = vec![
            make_category("a", "A", Some("b")),
            make_category("b", "B", Some("a")),
            make_category("r", "Root", None),
        ];
        let tree = build_tree(&categories, None);
        assert_eq!(names(&tree), ["Root"]);

        // Rooting inside the cycle still terminates and never repeats a node
        let sub = build_tree(&categories, Some("a"));
        let flat = flatten_tree(&sub);
        let ids: Vec<_> = flat.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
    }

    #[test]
    fn test_duplicate_ids_appear_once() {
        let categories = vec![
            make_category("1", "Work", None),
            make_category("1", "Work", None),
        ];
        assert_eq!(build_tree(&categories, None).len(), 1);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut categories = vec![
            make_category("1", "Work", None),
            make_category("2", "Projects", Some("1")),
            make_category("3", "Home", None),
            make_category("4", "Garden", Some("3")),
            make_category("5", "Orphan", Some("nope")),
        ];
        sort_categories(&mut categories);
        let tree = build_tree(&categories, None);
        let rebuilt = build_tree(&flatten_tree(&tree), None);
        assert_eq!(tree, rebuilt);
    }

    #[test]
    fn test_apply_todo_counts() {
        let categories = vec![
            make_category("1", "Work", None),
            make_category("2", "Projects", Some("1")),
        ];
        let mut tree = build_tree(&categories, None);
        let counts = HashMap::from([("2".to_string(), 1)]);
        apply_todo_counts(&mut tree, &counts);
        assert_eq!(tree[0].todo_count, Some(0));
        assert_eq!(tree[0].children[0].todo_count, Some(1));
    }

    #[test]
    fn test_subtree_ids() {
        let categories = vec![
            make_category("a", "A", None),
            make_category("b", "B", Some("a")),
            make_category("c", "C", Some("b")),
            make_category("d", "D", None),
        ];
        let ids = subtree_ids(&categories, "b");
        assert_eq!(ids, HashSet::from(["b".to_string(), "c".to_string()]));
        assert_eq!(subtree_ids(&categories, "a").len(), 3);
    }

    #[test]
    fn test_find_in_tree() {
        let categories = vec![
            make_category("a", "A", None),
            make_category("b", "B", Some("a")),
        ];
        let tree = build_tree(&categories, None);
        assert_eq!(find_in_tree(&tree, "b").map(|n| n.category.name.as_str()), Some("B"));
        assert!(find_in_tree(&tree, "z").is_none());
    }
}
