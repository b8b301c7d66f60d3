use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::ApiError;

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self { data }
    }
}

/// Failure envelope: `{"errors": {"message": "..."}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: MessageResponse,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: MessageResponse::new(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `axum::Json` whose rejection is reported through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Path` whose rejection is reported through [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
