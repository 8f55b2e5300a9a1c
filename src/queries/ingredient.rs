//! Ingredient catalog queries

use sqlx::{SqliteConnection, SqlitePool};

/// Ingredient row from the catalog
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

pub async fn get_ingredient(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<IngredientRow>, sqlx::Error> {
    sqlx::query_as::<_, IngredientRow>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// List the catalog, optionally narrowed to names containing the search term
/// (case-insensitive), ordered by name
///
/// The match runs in Rust rather than via SQL LIKE: SQLite folds case for
/// ASCII only, and the catalog holds non-ASCII names. The catalog is small
/// and already served unpaginated, so one full scan is the normal read.
pub async fn list_ingredients(
    pool: &SqlitePool,
    name: Option<&str>,
) -> Result<Vec<IngredientRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, IngredientRow>(
        "SELECT id, name, measurement_unit FROM ingredients ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(match name {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            rows.into_iter()
                .filter(|row| row.name.to_lowercase().contains(&term))
                .collect()
        }
        _ => rows,
    })
}

/// Insert unless the (name, unit) pair already exists; returns true on insert.
/// Takes a connection so the bulk loader can run inside one transaction.
pub async fn insert_ingredient_if_missing(
    conn: &mut SqliteConnection,
    name: &str,
    measurement_unit: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO ingredients (name, measurement_unit) VALUES (?, ?)",
    )
    .bind(name)
    .bind(measurement_unit)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_ingredients(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
        .fetch_one(pool)
        .await
}
