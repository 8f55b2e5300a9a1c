use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthUser, MaybeAuthUser, password};
use crate::error::{AppError, AppResult};
use crate::media;
use crate::pagination::{Page, PageQuery};
use crate::queries;
use crate::queries::user::UserRow;
use crate::routes::AppState;
use crate::serializers::{self, SubscriptionResponse, UserResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub last_name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// POST /api/users - register a new account
pub async fn register(
    State(app): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    if queries::user::email_or_username_taken(&app.pool, &input.email, &input.username).await? {
        return Err(AppError::BadRequest(
            "A user with that email or username already exists.".to_string(),
        ));
    }

    let user = UserRow {
        id: Uuid::new_v4().to_string(),
        email: input.email,
        username: input.username,
        first_name: input.first_name,
        last_name: input.last_name,
        hashed_password: password::hash_password(&input.password)?,
        avatar: None,
        created_at: queries::unix_now(),
    };

    queries::user::insert_user(&app.pool, &user).await?;

    tracing::info!(user = %user.id, email = %user.email, "User registered");

    let body = serializers::user_response(&app.pool, None, &user).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/users - paginated public listing
pub async fn list(
    State(app): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<UserResponse>>> {
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());

    let count = queries::user::count_users(&app.pool).await?;
    let rows = queries::user::list_users(&app.pool, page.limit(), page.offset()).await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in &rows {
        results.push(serializers::user_response(&app.pool, viewer_id, row).await?);
    }

    Ok(Json(Page::new("/api/users", &page, count, results)))
}

/// GET /api/users/me
pub async fn me(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<UserResponse>> {
    let body = serializers::user_response(&app.pool, Some(&user.id), &user).await?;
    Ok(Json(body))
}

/// GET /api/users/{id}
pub async fn detail(
    State(app): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = queries::user::get_user(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    let body = serializers::user_response(&app.pool, viewer_id, &user).await?;
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/users/set_password
pub async fn set_password(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<SetPasswordInput>,
) -> AppResult<impl IntoResponse> {
    if !password::verify_password(&input.current_password, &user.hashed_password)? {
        return Err(AppError::BadRequest(
            "Current password is incorrect.".to_string(),
        ));
    }

    if input.new_password.len() < 8 {
        return Err(AppError::Validation(
            "New password must be at least 8 characters long".to_string(),
        ));
    }

    let hashed = password::hash_password(&input.new_password)?;
    queries::user::set_password(&app.pool, &user.id, &hashed).await?;

    tracing::info!(user = %user.id, "Password changed");

    Ok(Json(json!({ "status": "Password changed successfully." })))
}

#[derive(Debug, Deserialize)]
pub struct AvatarInput {
    pub avatar: String,
}

/// PUT /api/users/me/avatar
pub async fn put_avatar(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<AvatarInput>,
) -> AppResult<impl IntoResponse> {
    let stored = media::save_image(&app.config.media.root, "avatars", &input.avatar).await?;

    if let Some(old) = &user.avatar {
        media::delete_image(&app.config.media.root, old).await;
    }

    queries::user::set_avatar(&app.pool, &user.id, Some(&stored)).await?;

    Ok(Json(json!({ "avatar": stored })))
}

/// DELETE /api/users/me/avatar
pub async fn delete_avatar(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<StatusCode> {
    let Some(avatar) = &user.avatar else {
        return Err(AppError::BadRequest("No avatar is set.".to_string()));
    };

    media::delete_image(&app.config.media.root, avatar).await;
    queries::user::set_avatar(&app.pool, &user.id, None).await?;

    Ok(StatusCode::NO_CONTENT)
}

// PageQuery fields are inlined; serde's flatten does not mix with the
// query-string deserializer for numeric fields
#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub recipes_limit: Option<i64>,
}

/// GET /api/users/subscriptions - authors the caller follows
pub async fn subscriptions(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SubscriptionsQuery>,
) -> AppResult<Json<Page<SubscriptionResponse>>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };

    let count = queries::user::count_subscriptions(&app.pool, &user.id).await?;
    let authors =
        queries::user::list_subscribed_authors(&app.pool, &user.id, page.limit(), page.offset())
            .await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        results.push(
            serializers::subscription_response(&app.pool, &user.id, author, query.recipes_limit)
                .await?,
        );
    }

    let recipes_limit = query.recipes_limit.map(|l| l.to_string());
    let params: Vec<(&str, &str)> = recipes_limit
        .as_deref()
        .map(|l| vec![("recipes_limit", l)])
        .unwrap_or_default();

    Ok(Json(Page::with_params(
        "/api/users/subscriptions",
        &page,
        &params,
        count,
        results,
    )))
}

/// POST /api/users/{id}/subscribe
pub async fn subscribe(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let author = queries::user::get_user(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if author.id == user.id {
        return Err(AppError::BadRequest(
            "Cannot subscribe to yourself.".to_string(),
        ));
    }

    if !queries::user::insert_subscription(&app.pool, &user.id, &author.id).await? {
        return Err(AppError::BadRequest("Already subscribed.".to_string()));
    }

    tracing::info!(user = %user.id, author = %author.id, "Subscription created");

    let body = serializers::subscription_response(&app.pool, &user.id, &author, None).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// DELETE /api/users/{id}/subscribe
pub async fn unsubscribe(
    State(app): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let author = queries::user::get_user(&app.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !queries::user::delete_subscription(&app.pool, &user.id, &author.id).await? {
        return Err(AppError::BadRequest("Not subscribed.".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
