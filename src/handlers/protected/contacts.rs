use axum::extract::{Path, RawQuery, State};

use crate::database::models::{Contact, ContactWithCctvs, CreateContact, UpdateContact};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, ListResults};
use crate::services::contact_service::ENTITY;
use crate::state::AppState;

use super::utils::list_query;

/// GET /contacts - each contact carries its CCTVs
pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<ListResults<ContactWithCctvs>> {
    let (list, pagination) = state.contacts.list(&list_query(query)).await?;
    Ok(ApiResponse::list(format!("Successfully get all {}", ENTITY), list, pagination))
}

/// GET /contacts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ContactWithCctvs> {
    let contact = state.contacts.get_by_id(&id).await?;
    Ok(ApiResponse::success(format!("Successfully get {}", ENTITY), contact))
}

/// POST /contacts
pub async fn create(State(state): State<AppState>, JsonBody(payload): JsonBody<CreateContact>) -> ApiResult<Contact> {
    let contact = state.contacts.create(payload).await?;
    Ok(ApiResponse::success(format!("{} created successfully", ENTITY), contact))
}

/// PUT|PATCH /contacts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateContact>,
) -> ApiResult<Contact> {
    let contact = state.contacts.update_by_id(&id, payload).await?;
    Ok(ApiResponse::success(format!("{} updated successfully", ENTITY), contact))
}

/// DELETE /contacts/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.contacts.delete_by_id(&id).await?;
    Ok(ApiResponse::success(format!("{} deleted successfully", ENTITY), ()))
}
