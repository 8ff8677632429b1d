//! HTTP handlers for ingredient catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Ingredient;
use crate::services::ingredient::{CreateIngredientInput, IngredientService, UpdateIngredientInput};
use crate::AppState;

/// Create an ingredient, optionally with opening stock
pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateIngredientInput>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    let service = IngredientService::new(state.db, state.units);
    let ingredient = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// List ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Ingredient>>> {
    let service = IngredientService::new(state.db, state.units);
    let ingredients = service.list(pagination).await?;
    Ok(Json(ingredients))
}

/// Get an ingredient by ID
pub async fn get_ingredient(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db, state.units);
    let ingredient = service.get(ingredient_id).await?;
    Ok(Json(ingredient))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<UpdateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db, state.units);
    let ingredient = service.update(ingredient_id, input).await?;
    Ok(Json(ingredient))
}
