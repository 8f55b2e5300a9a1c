pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod shopping_cart;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let probes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.pool.clone());

    let api = Router::new()
        .route("/api/auth/token/login", post(auth::login))
        .route("/api/auth/token/logout", post(auth::logout))
        .route("/api/users", get(users::list).post(users::register))
        .route("/api/users/me", get(users::me))
        .route(
            "/api/users/me/avatar",
            put(users::put_avatar).delete(users::delete_avatar),
        )
        .route("/api/users/set_password", post(users::set_password))
        .route("/api/users/subscriptions", get(users::subscriptions))
        .route("/api/users/{id}", get(users::detail))
        .route(
            "/api/users/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .route("/api/ingredients", get(ingredients::list))
        .route("/api/ingredients/{id}", get(ingredients::detail))
        .route("/api/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/api/recipes/download_shopping_cart",
            get(shopping_cart::download),
        )
        .route("/api/recipes/shopping_cart", get(shopping_cart::list))
        .route(
            "/api/recipes/{id}",
            get(recipes::detail)
                .patch(recipes::update)
                .delete(recipes::delete),
        )
        .route("/api/recipes/{id}/get-link", get(recipes::get_link))
        .route(
            "/api/recipes/{id}/favorite",
            post(recipes::favorite).delete(recipes::unfavorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(shopping_cart::add).delete(shopping_cart::remove),
        )
        .with_state(state);

    probes.merge(api).layer(TraceLayer::new_for_http())
}
