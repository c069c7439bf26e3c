use axum::extract::{Extension, Path, RawQuery, State};

use crate::database::models::{CreateUser, PublicUser, UpdateUser};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, ListResults};
use crate::services::user_service::ENTITY;
use crate::state::AppState;

use super::utils::list_query;

/// GET /users
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ListResults<PublicUser>> {
    let (list, pagination) = state.users.list(&list_query(query)).await?;
    Ok(ApiResponse::list(format!("Successfully get all {}", ENTITY), list, pagination))
}

/// GET /users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PublicUser> {
    let user = state.users.get_by_id(&id).await?;
    Ok(ApiResponse::success(format!("Successfully get {}", ENTITY), user))
}

/// GET /user/me
pub async fn me(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<PublicUser> {
    let user = state.auth.me(&auth_user.user_id).await?;
    Ok(ApiResponse::success(format!("Successfully get {}", ENTITY), user))
}

/// POST /users - same rules as sign-up
pub async fn create(State(state): State<AppState>, JsonBody(payload): JsonBody<CreateUser>) -> ApiResult<PublicUser> {
    let user = state.auth.signup(payload).await?;
    Ok(ApiResponse::success(format!("{} created successfully", ENTITY), user))
}

/// PUT|PATCH /users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUser>,
) -> ApiResult<PublicUser> {
    let user = state.users.update_by_id(&id, payload).await?;
    Ok(ApiResponse::success(format!("{} updated successfully", ENTITY), user))
}

/// DELETE /users/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<()> {
    tracing::info!("User {} <{}> deleting user {}", auth_user.user_id, auth_user.email, id);
    state.users.delete_by_id(&id, &auth_user.user_id).await?;
    Ok(ApiResponse::success(format!("{} deleted successfully", ENTITY), ()))
}
