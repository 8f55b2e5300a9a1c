use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{AppError, AppResult};
use crate::media;
use crate::pagination::{Page, PageQuery};
use crate::queries;
use crate::queries::recipe::{RecipeFilters, RecipeRow};
use crate::routes::AppState;
use crate::serializers::{self, RecipeResponse, RecipeShortResponse};

/// Flag values the source system accepts as true on listing filters
fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("True"))
}

// PageQuery fields are inlined; serde's flatten does not mix with the
// query-string deserializer for numeric fields
#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Active filter params, echoed into the pagination links
    fn link_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::new();
        if let Some(author) = &self.author {
            params.push(("author", author.as_str()));
        }
        if let Some(value) = &self.is_favorited {
            params.push(("is_favorited", value.as_str()));
        }
        if let Some(value) = &self.is_in_shopping_cart {
            params.push(("is_in_shopping_cart", value.as_str()));
        }
        params
    }
}

/// GET /api/recipes - paginated, newest first
pub async fn list(
    State(app): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(query): Query<RecipeListQuery>,
) -> AppResult<Json<Page<RecipeResponse>>> {
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    let page = query.page_query();
    let params = query.link_params();

    let mut filters = RecipeFilters {
        author: query.author.clone(),
        ..Default::default()
    };

    if is_truthy(query.is_favorited.as_deref()) {
        match viewer_id {
            Some(id) => filters.favorited_by = Some(id.to_string()),
            // Anonymous callers have no favorites; return an empty page
            // rather than an error
            None => {
                return Ok(Json(Page::with_params(
                    "/api/recipes",
                    &page,
                    &params,
                    0,
                    Vec::new(),
                )));
            }
        }
    }

    if is_truthy(query.is_in_shopping_cart.as_deref()) {
        match viewer_id {
            Some(id) => filters.in_cart_of = Some(id.to_string()),
            None => {
                return Ok(Json(Page::with_params(
                    "/api/recipes",
                    &page,
                    &params,
                    0,
                    Vec::new(),
                )));
            }
        }
    }

    let count = queries::recipe::count_recipes(&app.pool, &filters).await?;
    let rows =
        queries::recipe::list_recipes(&app.pool, &filters, page.limit(), page.offset()).await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in &rows {
        results.push(serializers::recipe_response(&app.pool, viewer_id, row).await?);
    }

    Ok(Json(Page::with_params(
        "/api/recipes",
        &page,
        &params,
        count,
        results,
    )))
}

#[derive(Debug, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i64,
    pub amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(range(min = 1))]
    pub cooking_time: i64,
    pub image: String,
    pub ingredients: Vec<IngredientAmountInput>,
}

/// Check ingredient lines: at least one, amounts positive, catalog ids
/// resolvable, no duplicate ingredient per recipe
async fn resolve_lines(
    pool: &SqlitePool,
    lines: &[IngredientAmountInput],
) -> AppResult<Vec<(i64, i64)>> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "A recipe needs at least one ingredient".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(lines.len());

    for line in lines {
        if line.amount < 1 {
            return Err(AppError::Validation(
                "Ingredient amount must be at least 1".to_string(),
            ));
        }
        if !seen.insert(line.id) {
            return Err(AppError::Validation(format!(
                "Duplicate ingredient {} in recipe",
                line.id
            )));
        }
        if queries::ingredient::get_ingredient(pool, line.id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Unknown ingredient id {}",
                line.id
            )));
        }
        resolved.push((line.id, line.amount));
    }

    Ok(resolved)
}

/// POST /api/recipes
pub async fn create(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let lines = resolve_lines(&app.pool, &input.ingredients).await?;

    let image = media::save_image(&app.config.media.root, "recipes", &input.image).await?;

    let recipe = RecipeRow {
        id: Uuid::new_v4().to_string(),
        author_id: user.id.clone(),
        name: input.name,
        image,
        text: input.text,
        cooking_time: input.cooking_time,
        pub_date: queries::unix_now(),
    };

    queries::recipe::insert_recipe(&app.pool, &recipe, &lines).await?;

    tracing::info!(recipe = %recipe.id, author = %user.id, "Recipe created");

    let body = serializers::recipe_response(&app.pool, Some(&user.id), &recipe).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/recipes/{id}
pub async fn detail(
    State(app): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<RecipeResponse>> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    let body = serializers::recipe_response(&app.pool, viewer_id, &recipe).await?;
    Ok(Json(body))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(range(min = 1))]
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

/// PATCH /api/recipes/{id} - author only; when ingredients are supplied the
/// existing lines are replaced wholesale
pub async fn update(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<Json<RecipeResponse>> {
    input.validate()?;

    let mut recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if recipe.author_id != user.id {
        return Err(AppError::PermissionDenied);
    }

    let lines = match &input.ingredients {
        Some(lines) => Some(resolve_lines(&app.pool, lines).await?),
        None => None,
    };

    if let Some(name) = input.name {
        recipe.name = name;
    }
    if let Some(text) = input.text {
        recipe.text = text;
    }
    if let Some(cooking_time) = input.cooking_time {
        recipe.cooking_time = cooking_time;
    }
    if let Some(image) = &input.image {
        let stored = media::save_image(&app.config.media.root, "recipes", image).await?;
        media::delete_image(&app.config.media.root, &recipe.image).await;
        recipe.image = stored;
    }

    queries::recipe::update_recipe(&app.pool, &recipe, lines.as_deref()).await?;

    let body = serializers::recipe_response(&app.pool, Some(&user.id), &recipe).await?;
    Ok(Json(body))
}

/// DELETE /api/recipes/{id} - author only
pub async fn delete(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if recipe.author_id != user.id {
        return Err(AppError::PermissionDenied);
    }

    queries::recipe::delete_recipe(&app.pool, &recipe.id).await?;
    media::delete_image(&app.config.media.root, &recipe.image).await;

    tracing::info!(recipe = %recipe.id, author = %user.id, "Recipe deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/{id}/get-link
pub async fn get_link(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let short_link = format!("{}/recipes/{}", app.config.server.base_url, recipe.id);
    Ok(Json(json!({ "short-link": short_link })))
}

/// POST /api/recipes/{id}/favorite
pub async fn favorite(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !queries::recipe::insert_favorite(&app.pool, &user.id, &recipe.id).await? {
        return Err(AppError::BadRequest("Already in favorites.".to_string()));
    }

    let body = RecipeShortResponse::from(&recipe);
    Ok((StatusCode::CREATED, Json(body)))
}

/// DELETE /api/recipes/{id}/favorite
pub async fn unfavorite(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let recipe = queries::recipe::get_recipe(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !queries::recipe::delete_favorite(&app.pool, &user.id, &recipe.id).await? {
        return Err(AppError::BadRequest(
            "Not found in favorites.".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
