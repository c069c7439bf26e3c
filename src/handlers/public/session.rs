use axum::extract::State;

use crate::database::models::{CreateUser, PublicUser};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::{LoginRequest, LoginResponse};
use crate::state::AppState;

/// POST /signup
pub async fn signup(State(state): State<AppState>, JsonBody(payload): JsonBody<CreateUser>) -> ApiResult<PublicUser> {
    let user = state.auth.signup(payload).await?;
    Ok(ApiResponse::success("User created successfully", user))
}

/// POST /login
///
/// Issues a new access/refresh pair and replaces the stored session, so
/// tokens from any earlier login stop working.
pub async fn login(State(state): State<AppState>, JsonBody(request): JsonBody<LoginRequest>) -> ApiResult<LoginResponse> {
    let session = state.auth.login(request).await?;
    Ok(ApiResponse::success("User logged in successfully", session))
}
