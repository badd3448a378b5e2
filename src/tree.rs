//! Tree Utilities
//!
//! Helper functions for tree rendering.

use notetree_domain::{Category, CategoryWithChildren};

use crate::expanded::ExpandedState;

/// One displayed line of the category tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub category: Category,
    pub depth: usize,
    pub todo_count: u32,
    pub has_children: bool,
    pub expanded: bool,
}

/// Flatten the tree into display order using recursive DFS
///
/// Children of collapsed categories are skipped.
pub fn visible_rows(tree: &[CategoryWithChildren], expanded: &ExpandedState) -> Vec<TreeRow> {
    fn collect(
        nodes: &[CategoryWithChildren],
        depth: usize,
        expanded: &ExpandedState,
        result: &mut Vec<TreeRow>,
    ) {
        for node in nodes {
            let is_expanded = expanded.is_expanded(&node.category.id);
            result.push(TreeRow {
                category: node.category.clone(),
                depth,
                todo_count: node.todo_count.unwrap_or(0),
                has_children: !node.children.is_empty(),
                expanded: is_expanded,
            });
            // If not collapsed, add its children
            if is_expanded {
                collect(&node.children, depth + 1, expanded, result);
            }
        }
    }

    let mut result = Vec::new();
    collect(tree, 0, expanded, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use notetree_domain::build_tree;

    fn make_category(id: &str, parent_id: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: format!("Category {}", id),
            parent_id: parent_id.map(str::to_string),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn sample_tree() -> Vec<CategoryWithChildren> {
        let categories = vec![
            make_category("1", None),      // Root 1
            make_category("2", None),      // Root 2
            make_category("3", Some("1")), // Child of 1
            make_category("4", Some("1")), // Child of 1
            make_category("5", Some("3")), // Child of 3 (grandchild of 1)
        ];
        build_tree(&categories, None)
    }

    fn ids_and_depths(rows: &[TreeRow]) -> Vec<(&str, usize)> {
        rows.iter().map(|r| (r.category.id.as_str(), r.depth)).collect()
    }

    #[test]
    fn test_visible_rows_all_expanded() {
        let rows = visible_rows(&sample_tree(), &ExpandedState::default());

        // Should be: 1 (depth 0), 3 (depth 1), 5 (depth 2), 4 (depth 1), 2 (depth 0)
        assert_eq!(
            ids_and_depths(&rows),
            [("1", 0), ("3", 1), ("5", 2), ("4", 1), ("2", 0)]
        );
        assert!(rows[0].has_children);
        assert!(!rows[2].has_children);
    }

    #[test]
    fn test_collapsed_hides_descendants() {
        let mut expanded = ExpandedState::default();
        expanded.set("3", false);
        let rows = visible_rows(&sample_tree(), &expanded);
        assert_eq!(ids_and_depths(&rows), [("1", 0), ("3", 1), ("4", 1), ("2", 0)]);
        assert!(!rows[1].expanded);

        expanded.set("1", false);
        let rows = visible_rows(&sample_tree(), &expanded);
        assert_eq!(ids_and_depths(&rows), [("1", 0), ("2", 0)]);
    }
}
