use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::{AuthUser, jwt, password};
use crate::error::{AppError, AppResult};
use crate::queries;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/token/login
pub async fn login(
    State(app): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<Value>> {
    let invalid =
        || AppError::BadRequest("Unable to log in with provided credentials.".to_string());

    let user = queries::user::get_user_by_email(&app.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&input.password, &user.hashed_password)? {
        return Err(invalid());
    }

    let lifetime_seconds = (app.config.jwt.expiration_days as u64) * 86_400;
    let token = jwt::generate_token(user.id.clone(), &app.config.jwt.secret, lifetime_seconds)?;

    tracing::info!(user = %user.id, "User logged in");

    Ok(Json(json!({ "auth_token": token })))
}

/// POST /api/auth/token/logout
///
/// Tokens are stateless, so there is nothing to revoke server-side; the
/// endpoint exists so clients can drop their token through a uniform flow.
pub async fn logout(AuthUser(_user): AuthUser) -> StatusCode {
    StatusCode::NO_CONTENT
}
