use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiJson, ApiPath, ApiResponse, AppState, MessageResponse};
use crate::domain::{ContactId, Principal};
use crate::models::{ContactDto, ContactPatch, NewContact};
use crate::services::ContactError;

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound(msg) => Self::NotFound(msg),
            ContactError::Validation(msg) => Self::validation(msg),
            ContactError::Database(msg) => Self::DatabaseError(msg),
            ContactError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// `GET /api/contacts`
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<ContactDto>>>, ApiError> {
    let contacts = state.contact_service().list_contacts(&principal).await?;
    Ok(Json(ApiResponse::success(contacts)))
}

/// `POST /api/contacts`
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiJson(payload): ApiJson<NewContact>,
) -> Result<(StatusCode, Json<ApiResponse<ContactDto>>), ApiError> {
    let contact = state
        .contact_service()
        .create_contact(&principal, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(contact))))
}

/// `GET /api/contacts/{id}`
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<ContactId>,
) -> Result<Json<ApiResponse<ContactDto>>, ApiError> {
    let contact = state.contact_service().get_contact(&principal, id).await?;
    Ok(Json(ApiResponse::success(contact)))
}

/// `PUT|PATCH /api/contacts/{id}`
///
/// Merge-patch: absent fields are left untouched, `null` clears.
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<ContactId>,
    ApiJson(patch): ApiJson<ContactPatch>,
) -> Result<Json<ApiResponse<ContactDto>>, ApiError> {
    let contact = state
        .contact_service()
        .update_contact(&principal, id, patch)
        .await?;
    Ok(Json(ApiResponse::success(contact)))
}

/// `DELETE /api/contacts/{id}`
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<ContactId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.contact_service().delete_contact(&principal, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Contact deleted successfully",
    ))))
}
