use crate::{
    audit,
    db::DbPool,
    dto::users::{UpdateProfileRequest, UserProfile},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
};

pub async fn get_profile(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;

    let row = match row {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success("OK", UserProfile::from(row), None))
}

pub async fn update_profile(
    pool: &DbPool,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.unwrap_or(existing.name);
    let address = payload.address.or(existing.address);
    let phone = payload.phone.or(existing.phone);

    let updated: User = sqlx::query_as(
        r#"
        UPDATE users
        SET name = $2, address = $3, phone = $4, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(name)
    .bind(address)
    .bind(phone)
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        Some(user.user_id),
        "profile_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.user_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        UserProfile::from(updated),
        Some(Meta::empty()),
    ))
}
