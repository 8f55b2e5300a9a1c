//! Shopping-cart membership and the cart read feeding the aggregator

use potluck_shopping::IngredientLine;
use sqlx::SqlitePool;

use super::unix_now;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CartLineRow {
    name: String,
    measurement_unit: String,
    amount: i64,
}

pub async fn in_cart(
    pool: &SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM shopping_carts WHERE user_id = ? AND recipe_id = ?)",
    )
    .bind(user_id)
    .bind(recipe_id)
    .fetch_one(pool)
    .await
}

/// Add a recipe to the cart; returns false when it was already there
pub async fn add_to_cart(
    pool: &SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO shopping_carts (user_id, recipe_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(unix_now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a recipe from the cart; returns false when it was not there
pub async fn remove_from_cart(
    pool: &SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shopping_carts WHERE user_id = ? AND recipe_id = ?")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Every resolved ingredient line across every recipe in the user's cart,
/// in one snapshot read. This is the single store access behind the
/// shopping-list download; the aggregation itself is pure and request-local.
pub async fn list_cart_ingredient_lines(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<IngredientLine>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT i.name, i.measurement_unit, ri.amount
         FROM shopping_carts sc
         JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE sc.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| IngredientLine {
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount as u64,
        })
        .collect())
}
