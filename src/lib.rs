pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod observability;
pub mod pagination;
pub mod queries;
pub mod routes;
pub mod serializers;

pub use routes::AppState;

use axum::Router;
use sqlx::SqlitePool;

/// Assemble the application router from a pool and config
pub fn create_app(pool: SqlitePool, config: config::Config) -> Router {
    routes::router(AppState { pool, config })
}
