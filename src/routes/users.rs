use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::users::{UpdateProfileRequest, UserProfile},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile).put(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The current user's profile", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = user_service::get_profile(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Update name, address or phone", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = user_service::update_profile(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}
