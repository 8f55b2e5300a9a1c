//! JSON response shapes shared across routes
//!
//! The `is_subscribed` / `is_favorited` / `is_in_shopping_cart` flags are
//! always computed against the calling user at serialization time, never
//! stored; anonymous callers see them as false.

use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{AppError, AppResult};
use crate::queries;
use crate::queries::recipe::{RecipeFilters, RecipeRow};
use crate::queries::user::UserRow;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

/// Serialize a user, with `is_subscribed` computed against the viewer
pub async fn user_response(
    pool: &SqlitePool,
    viewer: Option<&str>,
    user: &UserRow,
) -> AppResult<UserResponse> {
    let is_subscribed = match viewer {
        Some(viewer_id) => queries::user::is_subscribed(pool, viewer_id, &user.id).await?,
        None => false,
    };

    Ok(UserResponse {
        id: user.id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
        avatar: user.avatar.clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: String,
    pub author: UserResponse,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub pub_date: String,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Serialize a recipe with its resolved ingredient lines and per-viewer flags
pub async fn recipe_response(
    pool: &SqlitePool,
    viewer: Option<&str>,
    recipe: &RecipeRow,
) -> AppResult<RecipeResponse> {
    let author = queries::user::get_user(pool, &recipe.author_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Recipe {} has no author row", recipe.id)))?;

    let ingredients = queries::recipe::list_ingredient_lines(pool, &recipe.id)
        .await?
        .into_iter()
        .map(|line| RecipeIngredientResponse {
            id: line.id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        })
        .collect();

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            queries::recipe::is_favorited(pool, viewer_id, &recipe.id).await?,
            queries::cart::in_cart(pool, viewer_id, &recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: recipe.id.clone(),
        author: user_response(pool, viewer, &author).await?,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        text: recipe.text.clone(),
        cooking_time: recipe.cooking_time,
        ingredients,
        pub_date: format_timestamp(recipe.pub_date)?,
        is_favorited,
        is_in_shopping_cart,
    })
}

/// Short recipe shape echoed by the favorite endpoint
#[derive(Debug, Serialize)]
pub struct RecipeShortResponse {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl From<&RecipeRow> for RecipeShortResponse {
    fn from(recipe: &RecipeRow) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
    pub recipes: Vec<RecipeResponse>,
    pub recipes_count: i64,
}

/// Serialize a followed author with their recipes
///
/// `recipes_limit` truncates the embedded recipe list only; `recipes_count`
/// always reports the author's full catalog size.
pub async fn subscription_response(
    pool: &SqlitePool,
    viewer_id: &str,
    author: &UserRow,
    recipes_limit: Option<i64>,
) -> AppResult<SubscriptionResponse> {
    let filters = RecipeFilters {
        author: Some(author.id.clone()),
        ..Default::default()
    };

    let recipes_count = queries::recipe::count_recipes_by_author(pool, &author.id).await?;
    let limit = recipes_limit.unwrap_or(recipes_count).max(0);

    let mut recipes = Vec::new();
    for row in queries::recipe::list_recipes(pool, &filters, limit, 0).await? {
        recipes.push(recipe_response(pool, Some(viewer_id), &row).await?);
    }

    Ok(SubscriptionResponse {
        id: author.id.clone(),
        email: author.email.clone(),
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: queries::user::is_subscribed(pool, viewer_id, &author.id).await?,
        avatar: author.avatar.clone(),
        recipes,
        recipes_count,
    })
}

fn format_timestamp(unix: i64) -> AppResult<String> {
    OffsetDateTime::from_unix_timestamp(unix)
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {unix}: {e}")))?
        .format(&Rfc3339)
        .map_err(|e| AppError::Internal(format!("Failed to format timestamp: {e}")))
}
