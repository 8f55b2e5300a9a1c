//! Recipe, ingredient-line, and favorite queries

use sqlx::SqlitePool;

use super::unix_now;

/// Recipe row from the recipes table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub pub_date: i64,
}

/// One ingredient line of a recipe with the catalog entry resolved
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientLineRow {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Optional narrowing of the recipe listing
#[derive(Debug, Default, Clone)]
pub struct RecipeFilters {
    pub author: Option<String>,
    pub favorited_by: Option<String>,
    pub in_cart_of: Option<String>,
}

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date";

fn filter_sql(filters: &RecipeFilters, select: &str, tail: &str) -> String {
    let mut sql = format!("SELECT {select} FROM recipes r");
    let mut clauses: Vec<&str> = Vec::new();

    if filters.favorited_by.is_some() {
        sql.push_str(" JOIN favorites f ON f.recipe_id = r.id");
        clauses.push("f.user_id = ?");
    }
    if filters.in_cart_of.is_some() {
        sql.push_str(" JOIN shopping_carts sc ON sc.recipe_id = r.id");
        clauses.push("sc.user_id = ?");
    }
    if filters.author.is_some() {
        clauses.push("r.author_id = ?");
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(tail);

    sql
}

// Bind order must mirror the clause order in filter_sql
fn bind_filters<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    filters: &'q RecipeFilters,
) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    let mut query = query;
    if let Some(user) = &filters.favorited_by {
        query = query.bind(user);
    }
    if let Some(user) = &filters.in_cart_of {
        query = query.bind(user);
    }
    if let Some(author) = &filters.author {
        query = query.bind(author);
    }
    query
}

/// List recipes newest first
pub async fn list_recipes(
    pool: &SqlitePool,
    filters: &RecipeFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<RecipeRow>, sqlx::Error> {
    let sql = filter_sql(
        filters,
        RECIPE_COLUMNS,
        " ORDER BY r.pub_date DESC, r.id LIMIT ? OFFSET ?",
    );

    bind_filters(sqlx::query_as::<_, RecipeRow>(&sql), filters)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_recipes(
    pool: &SqlitePool,
    filters: &RecipeFilters,
) -> Result<i64, sqlx::Error> {
    let sql = filter_sql(filters, "COUNT(*)", "");

    bind_filters(sqlx::query_as::<_, (i64,)>(&sql), filters)
        .fetch_one(pool)
        .await
        .map(|(count,)| count)
}

pub async fn get_recipe(
    pool: &SqlitePool,
    recipe_id: &str,
) -> Result<Option<RecipeRow>, sqlx::Error> {
    sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = ?"
    ))
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
}

/// Insert a recipe and its ingredient lines in one transaction
pub async fn insert_recipe(
    pool: &SqlitePool,
    recipe: &RecipeRow,
    lines: &[(i64, i64)],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO recipes (id, author_id, name, image, text, cooking_time, pub_date)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&recipe.id)
    .bind(&recipe.author_id)
    .bind(&recipe.name)
    .bind(&recipe.image)
    .bind(&recipe.text)
    .bind(recipe.cooking_time)
    .bind(recipe.pub_date)
    .execute(&mut *tx)
    .await?;

    for (ingredient_id, amount) in lines {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(&recipe.id)
        .bind(ingredient_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Update a recipe; when `lines` is provided the existing ingredient lines
/// are replaced wholesale, matching the source system's update behavior
pub async fn update_recipe(
    pool: &SqlitePool,
    recipe: &RecipeRow,
    lines: Option<&[(i64, i64)]>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE recipes SET name = ?, image = ?, text = ?, cooking_time = ? WHERE id = ?",
    )
    .bind(&recipe.name)
    .bind(&recipe.image)
    .bind(&recipe.text)
    .bind(recipe.cooking_time)
    .bind(&recipe.id)
    .execute(&mut *tx)
    .await?;

    if let Some(lines) = lines {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(&recipe.id)
            .execute(&mut *tx)
            .await?;

        for (ingredient_id, amount) in lines {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
            )
            .bind(&recipe.id)
            .bind(ingredient_id)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await
}

/// Delete a recipe; cascades remove its lines, favorites, and cart entries
pub async fn delete_recipe(pool: &SqlitePool, recipe_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Resolved ingredient lines of one recipe
pub async fn list_ingredient_lines(
    pool: &SqlitePool,
    recipe_id: &str,
) -> Result<Vec<IngredientLineRow>, sqlx::Error> {
    sqlx::query_as::<_, IngredientLineRow>(
        "SELECT i.id, i.name, i.measurement_unit, ri.amount
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?
         ORDER BY i.name, i.id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
}

pub async fn count_recipes_by_author(
    pool: &SqlitePool,
    author_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
}

pub async fn is_favorited(
    pool: &SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ? AND recipe_id = ?)",
    )
    .bind(user_id)
    .bind(recipe_id)
    .fetch_one(pool)
    .await
}

/// Add a favorite; returns false when it already existed
pub async fn insert_favorite(
    pool: &SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO favorites (user_id, recipe_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(unix_now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a favorite; returns false when there was none
pub async fn delete_favorite(
    pool: &SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
