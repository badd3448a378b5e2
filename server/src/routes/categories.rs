use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use notetree_domain::{
    Category, CategoryDetail, CategoryPatch, CategoryWithChildren, CreateCategoryRequest,
    DomainError, NewCategory, UpdateCategoryRequest,
};

use super::error::{ApiError, ApiJson, OrFail};
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", axum::routing::post(create_category))
        .route("/categories/tree", get(get_tree))
        .route("/categories/flat", get(get_flat))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

async fn get_tree(State(state): State<AppState>) -> Result<Json<Vec<CategoryWithChildren>>, ApiError> {
    let tree = state.categories.tree().await.or_fail("Failed to get categories")?;
    Ok(Json(tree))
}

async fn get_flat(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.categories.list().await.or_fail("Failed to get categories")?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryDetail>, ApiError> {
    state
        .categories
        .find_detail(&id)
        .await
        .or_fail("Failed to get category")?
        .map(Json)
        .ok_or_else(|| DomainError::not_found("Category not found").into())
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let input = NewCategory::from_request(req)?;
    let category = state
        .categories
        .create(input)
        .await
        .or_fail("Failed to create category")?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let patch = CategoryPatch::from_request(&id, req)?;
    let category = state
        .categories
        .update(&id, patch)
        .await
        .or_fail("Failed to update category")?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .categories
        .delete(&id)
        .await
        .or_fail("Failed to delete category")?;
    Ok(StatusCode::NO_CONTENT)
}
