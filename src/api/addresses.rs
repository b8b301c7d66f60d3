use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, ApiJson, ApiPath, ApiResponse, AppState, MessageResponse};
use crate::domain::{AddressId, AddressLocator, ContactId, Principal};
use crate::models::{AddressDto, AddressPatch, NewAddress};

/// `GET /api/contacts/{contact_id}/addresses`
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(contact_id): ApiPath<ContactId>,
) -> Result<Json<ApiResponse<Vec<AddressDto>>>, ApiError> {
    let addresses = state
        .address_service()
        .list_addresses(&principal, contact_id)
        .await?;
    Ok(Json(ApiResponse::success(addresses)))
}

/// `POST /api/contacts/{contact_id}/addresses`
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath(contact_id): ApiPath<ContactId>,
    ApiJson(payload): ApiJson<NewAddress>,
) -> Result<(StatusCode, Json<ApiResponse<AddressDto>>), ApiError> {
    let address = state
        .address_service()
        .create_address(&principal, contact_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(address))))
}

pub async fn get_address(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath((contact_id, address_id)): ApiPath<(ContactId, AddressId)>,
) -> Result<Json<ApiResponse<AddressDto>>, ApiError> {
    let address = state
        .address_service()
        .get_address(&principal, AddressLocator::nested(contact_id, address_id))
        .await?;
    Ok(Json(ApiResponse::success(address)))
}

pub async fn update_address(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath((contact_id, address_id)): ApiPath<(ContactId, AddressId)>,
    ApiJson(patch): ApiJson<AddressPatch>,
) -> Result<Json<ApiResponse<AddressDto>>, ApiError> {
    let address = state
        .address_service()
        .update_address(
            &principal,
            AddressLocator::nested(contact_id, address_id),
            patch,
        )
        .await?;
    Ok(Json(ApiResponse::success(address)))
}

pub async fn delete_address(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiPath((contact_id, address_id)): ApiPath<(ContactId, AddressId)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .address_service()
        .delete_address(&principal, AddressLocator::nested(contact_id, address_id))
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Address deleted successfully",
    ))))
}
