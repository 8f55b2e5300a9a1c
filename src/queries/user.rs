//! User and subscription queries

use sqlx::SqlitePool;

use super::unix_now;

/// User row from the users table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub hashed_password: String,
    pub avatar: Option<String>,
    pub created_at: i64,
}

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, hashed_password, avatar, created_at";

/// Get user by ID
pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Get user by email
pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn email_or_username_taken(
    pool: &SqlitePool,
    email: &str,
    username: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? OR username = ?)")
        .bind(email)
        .bind(username)
        .fetch_one(pool)
        .await
}

pub async fn insert_user(pool: &SqlitePool, user: &UserRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, username, first_name, last_name, hashed_password, avatar, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.hashed_password)
    .bind(&user.avatar)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_users(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn set_password(
    pool: &SqlitePool,
    user_id: &str,
    hashed_password: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = ? WHERE id = ?")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_avatar(
    pool: &SqlitePool,
    user_id: &str,
    avatar: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET avatar = ? WHERE id = ?")
        .bind(avatar)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Whether `user_id` follows `author_id`
pub async fn is_subscribed(
    pool: &SqlitePool,
    user_id: &str,
    author_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = ? AND author_id = ?)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

/// Insert a subscription; returns false when it already existed
pub async fn insert_subscription(
    pool: &SqlitePool,
    user_id: &str,
    author_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO subscriptions (user_id, author_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(author_id)
    .bind(unix_now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a subscription; returns false when there was none
pub async fn delete_subscription(
    pool: &SqlitePool,
    user_id: &str,
    author_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = ? AND author_id = ?")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Authors the user follows, oldest subscription first
pub async fn list_subscribed_authors(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.hashed_password, u.avatar, u.created_at
         FROM subscriptions s
         JOIN users u ON u.id = s.author_id
         WHERE s.user_id = ?
         ORDER BY s.created_at, u.id
         LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_subscriptions(pool: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
