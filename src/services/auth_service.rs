//! Domain service for registration, login and bearer-token authentication.

use thiserror::Error;

use crate::domain::{Principal, UserId};
use crate::models::{Credentials, LoginResult, NewUser, UserDto, UserPatch};

pub const TOKEN_REQUIRED: &str = "Authorization token required";
pub const INVALID_TOKEN: &str = "Invalid token";

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or unknown bearer token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Unknown username or wrong password; the two are not told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Strips an optional `Bearer ` prefix. Returns `None` for a blank value.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when a field is missing or the
    /// username is already taken.
    async fn register(&self, input: NewUser) -> Result<UserDto, AuthError>;

    /// Verifies credentials and issues a new token, replacing any previous one.
    async fn login(&self, credentials: Credentials) -> Result<LoginResult, AuthError>;

    /// Resolves the principal behind a raw `Authorization` header value.
    async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError>;

    /// Clears the stored token.
    async fn logout(&self, principal: &Principal) -> Result<(), AuthError>;

    async fn current_user(&self, principal: &Principal) -> Result<UserDto, AuthError>;

    /// Looks up a user by id. Only the principal's own record is visible.
    async fn get_user(&self, principal: &Principal, id: UserId) -> Result<UserDto, AuthError>;

    /// Merge-patch of name and/or password.
    async fn update_user(
        &self,
        principal: &Principal,
        patch: UserPatch,
    ) -> Result<UserDto, AuthError>;
}
