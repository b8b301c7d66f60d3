use serde::{Deserialize, Serialize};

use crate::domain::{ContactId, Patch, UserId};
use crate::entities::contacts;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDto {
    pub id: ContactId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<contacts::Model> for ContactDto {
    fn from(model: contacts::Model) -> Self {
        Self {
            id: ContactId::new(model.id),
            user_id: UserId::new(model.user_id),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
    #[serde(default)]
    pub first_name: Patch<String>,
    #[serde(default)]
    pub last_name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
}
