//! Shared setup for the HTTP integration tests
//!
//! Each test gets an in-memory database with all migrations applied and a
//! router built through the same constructor the server uses.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

/// In-memory database with migrations applied
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::query("PRAGMA foreign_keys = true")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_config() -> potluck::config::Config {
    potluck::config::Config {
        server: potluck::config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            base_url: "http://testserver".to_string(),
        },
        database: potluck::config::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: potluck::config::JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_string(),
            expiration_days: 7,
        },
        media: potluck::config::MediaConfig {
            root: std::env::temp_dir()
                .join(format!("potluck-test-{}", uuid::Uuid::new_v4().simple()))
                .to_string_lossy()
                .into_owned(),
        },
        observability: potluck::config::ObservabilityConfig::default(),
    }
}

pub async fn create_test_app(pool: SqlitePool) -> Router {
    potluck::create_app(pool, test_config())
}

/// Send one JSON request through the router
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register an account and return its id
pub async fn register_user(app: &Router, email: &str, username: &str, password: &str) -> String {
    let response = request(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "email": email,
            "username": username,
            "first_name": "Test",
            "last_name": "User",
            "password": password,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Log in and return the bearer token
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = request(
        app,
        "POST",
        "/api/auth/token/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["auth_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Register and log in, returning (user_id, token)
pub async fn register_and_login(
    app: &Router,
    email: &str,
    username: &str,
    password: &str,
) -> (String, String) {
    let id = register_user(app, email, username, password).await;
    let token = login(app, email, password).await;
    (id, token)
}

/// Seed the ingredient catalog; returns ids in input order
pub async fn seed_ingredients(pool: &SqlitePool, items: &[(&str, &str)]) -> Vec<i64> {
    let mut conn = pool.acquire().await.unwrap();
    let mut ids = Vec::with_capacity(items.len());
    for (name, unit) in items {
        potluck::queries::ingredient::insert_ingredient_if_missing(&mut conn, name, unit)
            .await
            .unwrap();
        let id: i64 =
            sqlx::query_scalar("SELECT id FROM ingredients WHERE name = ? AND measurement_unit = ?")
                .bind(name)
                .bind(unit)
                .fetch_one(pool)
                .await
                .unwrap();
        ids.push(id);
    }
    ids
}

/// 1x1 transparent PNG as a data URI, for image uploads
pub fn test_image() -> &'static str {
    "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg=="
}

/// Create a recipe through the API; returns its id
pub async fn create_recipe(
    app: &Router,
    token: &str,
    name: &str,
    ingredients: Vec<Value>,
) -> String {
    let response = request(
        app,
        "POST",
        "/api/recipes",
        Some(token),
        Some(json!({
            "name": name,
            "text": "Combine everything and cook.",
            "cooking_time": 30,
            "image": test_image(),
            "ingredients": ingredients,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    body_json(response).await["id"].as_str().unwrap().to_string()
}
