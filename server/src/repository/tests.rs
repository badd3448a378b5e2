//! Repository Integration Tests
//!
//! Tests for the category and todo repositories with in-memory SQLite.

#[cfg(test)]
mod tests {
    use crate::repository::{
        init_db, CategoryOperations, CategoryRepository, Repository, TodoOperations,
        TodoRepository,
    };
    use notetree_domain::{
        CategoryPatch, CreateCategoryRequest, CreateTodoRequest, DomainError, NewCategory, NewTodo,
        Todo, TodoPatch, TodoQuery, TodoSort, UpdateCategoryRequest, UpdateTodoRequest,
    };
    use std::path::PathBuf;
    use std::time::Duration;

    async fn setup_test_db() -> (CategoryRepository, TodoRepository) {
        // Use in-memory database for tests
        let db_path = PathBuf::from(":memory:");
        let db_state = init_db(&db_path).expect("Failed to init test DB");
        (
            CategoryRepository::new(db_state.connection()),
            TodoRepository::new(db_state.connection()),
        )
    }

    fn new_category(name: &str, parent_id: Option<&str>) -> NewCategory {
        NewCategory::from_request(CreateCategoryRequest {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        })
        .unwrap()
    }

    fn new_todo(category_id: &str, title: &str) -> NewTodo {
        NewTodo::from_request(CreateTodoRequest {
            category_id: category_id.to_string(),
            title: title.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    async fn todo_ids(todos: &TodoRepository) -> Vec<String> {
        let mut ids: Vec<_> = todos.list().await.unwrap().into_iter().map(|t| t.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_create_category() {
        let (categories, _) = setup_test_db().await;

        let created = categories.create(new_category("Work", None)).await.expect("Failed to create");

        assert!(!created.id.is_empty());
        assert_eq!(created.name, "Work");
        assert!(created.is_root());
        assert_eq!(created.created_at, created.updated_at);

        let found = categories.find_by_id(&created.id).await.expect("Find failed");
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_list_orders_by_name_case_sensitive() {
        let (categories, _) = setup_test_db().await;

        for name in ["beta", "Alpha", "alpha", "Beta"] {
            categories.create(new_category(name, None)).await.unwrap();
        }

        let names: Vec<_> = categories
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Alpha", "Beta", "alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_create_with_missing_parent() {
        let (categories, _) = setup_test_db().await;

        let err = categories
            .create(new_category("Child", Some("does-not-exist")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidReference(_)));
        assert!(categories.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_category() {
        let (categories, _) = setup_test_db().await;

        let work = categories.create(new_category("Work", None)).await.unwrap();
        let misc = categories.create(new_category("Misc", Some(&work.id))).await.unwrap();

        let patch = CategoryPatch::from_request(
            &misc.id,
            UpdateCategoryRequest {
                name: Some(" Someday ".to_string()),
                parent_id: Some(None),
            },
        )
        .unwrap();
        let updated = categories.update(&misc.id, patch).await.expect("Update failed");

        assert_eq!(updated.name, "Someday");
        assert!(updated.is_root());
        assert_eq!(updated.created_at, misc.created_at);
        assert_eq!(categories.find_by_id(&misc.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_category_and_parent() {
        let (categories, _) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();

        let rename = CategoryPatch::from_request(
            "ghost",
            UpdateCategoryRequest {
                name: Some("x".to_string()),
                parent_id: None,
            },
        )
        .unwrap();
        assert!(matches!(
            categories.update("ghost", rename).await,
            Err(DomainError::NotFound(_))
        ));

        let reparent = CategoryPatch::from_request(
            &work.id,
            UpdateCategoryRequest {
                name: None,
                parent_id: Some(Some("ghost".to_string())),
            },
        )
        .unwrap();
        assert!(matches!(
            categories.update(&work.id, reparent).await,
            Err(DomainError::InvalidReference(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_subtree_only() {
        let (categories, todos) = setup_test_db().await;

        let a = categories.create(new_category("A", None)).await.unwrap();
        let b = categories.create(new_category("B", Some(&a.id))).await.unwrap();
        let c = categories.create(new_category("C", Some(&b.id))).await.unwrap();
        let t1 = todos.create(new_todo(&a.id, "t1")).await.unwrap();
        todos.create(new_todo(&b.id, "t2")).await.unwrap();
        todos.create(new_todo(&c.id, "t3")).await.unwrap();

        categories.delete(&b.id).await.expect("Delete failed");

        let remaining: Vec<_> = categories.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(remaining, [a.id.clone()]);
        assert_eq!(todo_ids(&todos).await, [t1.id.clone()]);

        categories.delete(&a.id).await.expect("Delete failed");
        assert!(categories.list().await.unwrap().is_empty());
        assert!(todos.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let (categories, _) = setup_test_db().await;
        assert!(matches!(
            categories.delete(&"ghost".to_string()).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_terminates_on_cycle() {
        let (categories, todos) = setup_test_db().await;

        let a = categories.create(new_category("A", None)).await.unwrap();
        let b = categories.create(new_category("B", Some(&a.id))).await.unwrap();
        let keep = categories.create(new_category("Keep", None)).await.unwrap();
        todos.create(new_todo(&b.id, "in cycle")).await.unwrap();
        // Two sequential updates build A -> B -> A
        let patch = CategoryPatch::from_request(
            &a.id,
            UpdateCategoryRequest {
                name: None,
                parent_id: Some(Some(b.id.clone())),
            },
        )
        .unwrap();
        categories.update(&a.id, patch).await.unwrap();

        // Neither cyclic node is reachable from the root level
        let tree = categories.tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, keep.id);

        categories.delete(&a.id).await.unwrap();
        let remaining: Vec<_> = categories.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(remaining, [keep.id]);
        assert!(todos.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detail_and_tree_counts() {
        let (categories, todos) = setup_test_db().await;

        let work = categories.create(new_category("Work", None)).await.unwrap();
        let projects = categories.create(new_category("Projects", Some(&work.id))).await.unwrap();
        todos.create(new_todo(&projects.id, "Ship v1")).await.unwrap();

        let detail = categories.find_detail(&work.id).await.unwrap().unwrap();
        assert_eq!(detail.todo_count, 0);
        assert_eq!(detail.children_count, 1);
        assert!(categories.find_detail("ghost").await.unwrap().is_none());

        let tree = categories.tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.name, "Work");
        assert_eq!(tree[0].todo_count, Some(0));
        assert_eq!(tree[0].children[0].category.name, "Projects");
        assert_eq!(tree[0].children[0].todo_count, Some(1));
        assert!(tree[0].children[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_todo_round_trip() {
        let (categories, todos) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();

        let input = NewTodo::from_request(CreateTodoRequest {
            category_id: work.id.clone(),
            title: "Write post".to_string(),
            content: Some("<p>draft</p>".to_string()),
            author: Some("kim".to_string()),
            published_at: Some(1_700_000_000_000),
        })
        .unwrap();
        let created = todos.create(input.clone()).await.expect("Failed to create");
        let found = todos.find_by_id(&created.id).await.unwrap().expect("missing");

        let expected: Todo = input.into_todo(found.id.clone(), found.created_at);
        assert_eq!(found, expected);
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_create_todo_requires_existing_category() {
        let (_, todos) = setup_test_db().await;
        let err = todos.create(new_todo("ghost", "Nope")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_update_completed_only() {
        let (categories, todos) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();
        let created = todos.create(new_todo(&work.id, "Ship v1")).await.unwrap();

        let patch = TodoPatch::from_request(UpdateTodoRequest::completed(true)).unwrap();
        let updated = todos.update(&created.id, patch).await.expect("Update failed");

        assert!(updated.completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(todos.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_todo_errors() {
        let (categories, todos) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();
        let created = todos.create(new_todo(&work.id, "t")).await.unwrap();

        let patch = TodoPatch::from_request(UpdateTodoRequest::completed(true)).unwrap();
        assert!(matches!(
            todos.update("ghost", patch).await,
            Err(DomainError::NotFound(_))
        ));

        let move_patch = TodoPatch::from_request(UpdateTodoRequest {
            category_id: Some("ghost".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            todos.update(&created.id, move_patch).await,
            Err(DomainError::InvalidReference(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_todo() {
        let (categories, todos) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();
        let created = todos.create(new_todo(&work.id, "To delete")).await.unwrap();

        todos.delete(&created.id).await.expect("Delete failed");
        assert!(todos.find_by_id(&created.id).await.unwrap().is_none());
        assert!(matches!(
            todos.delete(&created.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sorting_and_filtering() {
        let (categories, todos) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();
        let home = categories.create(new_category("Home", None)).await.unwrap();

        let first = todos.create(new_todo(&work.id, "first")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = todos.create(new_todo(&work.id, "second")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let other = todos.create(new_todo(&home.id, "other")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let patch = TodoPatch::from_request(UpdateTodoRequest::completed(true)).unwrap();
        todos.update(&first.id, patch).await.unwrap();

        let titles = |list: Vec<Todo>| list.into_iter().map(|t| t.title).collect::<Vec<_>>();

        assert_eq!(titles(todos.list().await.unwrap()), ["other", "second", "first"]);
        assert_eq!(
            titles(todos.list_by(&TodoQuery::in_category(&work.id)).await.unwrap()),
            ["second", "first"]
        );
        let recent = TodoQuery {
            category_id: None,
            sort: TodoSort::Updated,
        };
        assert_eq!(titles(todos.list_by(&recent).await.unwrap()), ["first", "other", "second"]);
        assert_eq!(other.category_id, home.id);
        assert_ne!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_delete_all_scoped_and_global() {
        let (categories, todos) = setup_test_db().await;
        let work = categories.create(new_category("Work", None)).await.unwrap();
        let home = categories.create(new_category("Home", None)).await.unwrap();
        todos.create(new_todo(&work.id, "a")).await.unwrap();
        todos.create(new_todo(&work.id, "b")).await.unwrap();
        let kept = todos.create(new_todo(&home.id, "c")).await.unwrap();

        assert_eq!(todos.delete_all(Some(&work.id)).await.unwrap(), 2);
        assert_eq!(todo_ids(&todos).await, [kept.id]);

        assert_eq!(todos.delete_all(None).await.unwrap(), 1);
        assert!(todos.list().await.unwrap().is_empty());
        // Categories are untouched by a todo wipe
        assert_eq!(categories.list().await.unwrap().len(), 2);
    }
}
