use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::auth::jwt;
use crate::error::AppError;
use crate::queries;
use crate::queries::user::UserRow;
use crate::routes::AppState;

/// Extractor for handlers that require an authenticated caller
///
/// Reads the `Authorization: Bearer` header, validates the JWT, and verifies
/// the user row still exists. A valid token whose user has since been deleted
/// is rejected the same way as a missing or invalid token.
pub struct AuthUser(pub UserRow);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let claims = jwt::validate_token(bearer.token(), &state.config.jwt.secret)
            .map_err(|err| {
                tracing::warn!(err = %err, "Invalid JWT token");
                AppError::Unauthorized
            })?;

        let user = queries::user::get_user(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user = %claims.sub, "JWT for a user that no longer exists");
                AppError::Unauthorized
            })?;

        Ok(AuthUser(user))
    }
}

/// Extractor for handlers that work anonymously but personalize output
/// (`is_subscribed`, `is_favorited`, `is_in_shopping_cart`) when a valid
/// token is presented
pub struct MaybeAuthUser(pub Option<UserRow>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(user)) => Ok(MaybeAuthUser(Some(user))),
            // Store failures must surface; a missing or bad token is just anonymous
            Err(AppError::Database(e)) => Err(AppError::Database(e)),
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}
