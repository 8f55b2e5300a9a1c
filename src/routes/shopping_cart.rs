use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, PageQuery};
use crate::queries;
use crate::queries::recipe::RecipeFilters;
use crate::routes::AppState;
use crate::serializers::{self, RecipeResponse};

/// GET /api/recipes/shopping_cart - recipes currently in the caller's cart
pub async fn list(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<RecipeResponse>>> {
    let filters = RecipeFilters {
        in_cart_of: Some(user.id.clone()),
        ..Default::default()
    };

    let count = queries::recipe::count_recipes(&app.pool, &filters).await?;
    let rows =
        queries::recipe::list_recipes(&app.pool, &filters, page.limit(), page.offset()).await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in &rows {
        results.push(serializers::recipe_response(&app.pool, Some(&user.id), row).await?);
    }

    Ok(Json(Page::new(
        "/api/recipes/shopping_cart",
        &page,
        count,
        results,
    )))
}

/// POST /api/recipes/{id}/shopping_cart
pub async fn add(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !queries::cart::add_to_cart(&app.pool, &user.id, &recipe.id).await? {
        return Err(AppError::BadRequest(
            "Recipe already in shopping cart.".to_string(),
        ));
    }

    let body = serializers::recipe_response(&app.pool, Some(&user.id), &recipe).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// DELETE /api/recipes/{id}/shopping_cart
pub async fn remove(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !queries::cart::remove_from_cart(&app.pool, &user.id, &recipe.id).await? {
        return Err(AppError::BadRequest(
            "Recipe not in shopping cart.".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/download_shopping_cart
///
/// Snapshots every ingredient line in the caller's cart, folds equal
/// (name, unit) pairs together and streams the rendered report back as a
/// plain-text attachment. An empty cart yields a header-only file, not an
/// error.
pub async fn download(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<impl IntoResponse> {
    let lines = queries::cart::list_cart_ingredient_lines(&app.pool, &user.id).await?;
    let list = potluck_shopping::aggregate(lines);

    tracing::info!(user = %user.id, entries = list.len(), "Shopping list downloaded");

    let body = list.render(&user.username);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"".to_string(),
            ),
        ],
        body,
    ))
}
