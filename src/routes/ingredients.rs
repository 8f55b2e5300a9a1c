use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::queries;
use crate::queries::ingredient::IngredientRow;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// GET /api/ingredients - the catalog is served unpaginated
pub async fn list(
    State(app): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> AppResult<Json<Vec<IngredientRow>>> {
    let rows = queries::ingredient::list_ingredients(&app.pool, query.name.as_deref()).await?;
    Ok(Json(rows))
}

/// GET /api/ingredients/{id}
pub async fn detail(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<IngredientRow>> {
    let row = queries::ingredient::get_ingredient(&app.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(row))
}
