use axum::extract::{Path, RawQuery, State};

use crate::database::models::{Cctv, CctvWithContact, CreateCctv, UpdateCctv};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, ListResults};
use crate::services::cctv_service::ENTITY;
use crate::state::AppState;

use super::utils::list_query;

/// GET /cctvs - each CCTV carries its contact
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ListResults<CctvWithContact>> {
    let (list, pagination) = state.cctvs.list(&list_query(query)).await?;
    Ok(ApiResponse::list(format!("Successfully get all {}", ENTITY), list, pagination))
}

/// GET /cctvs/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CctvWithContact> {
    let cctv = state.cctvs.get_by_id(&id).await?;
    Ok(ApiResponse::success(format!("Successfully get {}", ENTITY), cctv))
}

/// POST /cctvs
pub async fn create(State(state): State<AppState>, JsonBody(payload): JsonBody<CreateCctv>) -> ApiResult<Cctv> {
    let cctv = state.cctvs.create(payload).await?;
    Ok(ApiResponse::success(format!("{} created successfully", ENTITY), cctv))
}

/// PUT|PATCH /cctvs/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateCctv>,
) -> ApiResult<Cctv> {
    let cctv = state.cctvs.update_by_id(&id, payload).await?;
    Ok(ApiResponse::success(format!("{} updated successfully", ENTITY), cctv))
}

/// DELETE /cctvs/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.cctvs.delete_by_id(&id).await?;
    Ok(ApiResponse::success(format!("{} deleted successfully", ENTITY), ()))
}
