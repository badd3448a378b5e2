use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use notetree_domain::{
    delete_scope, CreateTodoRequest, DomainError, NewTodo, Todo, TodoPatch, TodoQuery,
    UpdateTodoRequest,
};

use super::error::{ApiError, ApiJson, ApiQuery, OrFail};
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(create_todo).delete(delete_todos),
        )
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

/// Scope for `DELETE /todos`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteScope {
    category_id: Option<String>,
}

async fn list_todos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TodoQuery>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .todos
        .list_by(&query)
        .await
        .or_fail("Failed to get todos")?;
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    state
        .todos
        .find_by_id(&id)
        .await
        .or_fail("Failed to get todo")?
        .map(Json)
        .ok_or_else(|| DomainError::not_found("Todo not found").into())
}

async fn create_todo(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = NewTodo::from_request(req)?;
    let todo = state
        .todos
        .create(input)
        .await
        .or_fail("Failed to create todo")?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let patch = TodoPatch::from_request(req)?;
    let todo = state
        .todos
        .update(&id, patch)
        .await
        .or_fail("Failed to update todo")?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .todos
        .delete(&id)
        .await
        .or_fail("Failed to delete todo")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_todos(
    State(state): State<AppState>,
    ApiQuery(scope): ApiQuery<DeleteScope>,
) -> Result<StatusCode, ApiError> {
    let category_id = delete_scope(scope.category_id.as_deref())?;
    state
        .todos
        .delete_all(category_id)
        .await
        .or_fail("Failed to delete all todos")?;
    Ok(StatusCode::NO_CONTENT)
}
