use serde::{Deserialize, Serialize};

use crate::domain::{Patch, Principal, UserId};
use crate::entities::users;

/// Public view of a user. Never carries the password hash or the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            username: model.username,
            name: model.name,
        }
    }
}

impl From<&Principal> for UserDto {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            name: principal.name.clone(),
        }
    }
}

/// Returned by a successful login: the user plus the freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
}
