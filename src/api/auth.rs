use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, ApiJson, ApiResponse, AppState};
use crate::domain::Principal;
use crate::models::{Credentials, LoginResult, NewUser, UserDto, UserPatch};
use crate::services::AuthError;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(msg) => Self::Unauthorized(msg),
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::NotFound(msg) => Self::NotFound(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Bearer <token>` (the prefix is optional) to a
/// [`Principal`] and stores it in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let principal = authenticate(&state, header.as_deref()).await?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Shared by the middleware and the RPC dispatcher.
pub(super) async fn authenticate(
    state: &AppState,
    header: Option<&str>,
) -> Result<Principal, ApiError> {
    let principal = state.auth_service().authenticate(header).await?;
    tracing::Span::current().record("user_id", principal.id.value());
    Ok(principal)
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let user = state.auth_service().register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// `POST /api/login`
///
/// Issues a new token; any token handed out earlier stops working.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<Credentials>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state.auth_service().login(payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    state.auth_service().logout(&principal).await?;
    Ok(Json(ApiResponse::success(true)))
}

/// `GET /api/user`
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.auth_service().current_user(&principal).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// `PUT|PATCH /api/user`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.auth_service().update_user(&principal, patch).await?;
    Ok(Json(ApiResponse::success(user)))
}
