use serde::{Deserialize, Serialize};

use crate::domain::{AddressId, ContactId, Patch};
use crate::entities::addresses;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressDto {
    pub id: AddressId,
    #[serde(skip_serializing)]
    pub contact_id: ContactId,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
}

impl From<addresses::Model> for AddressDto {
    fn from(model: addresses::Model) -> Self {
        Self {
            id: AddressId::new(model.id),
            contact_id: ContactId::new(model.contact_id),
            street: model.street,
            city: model.city,
            province: model.province,
            postal_code: model.postal_code,
            country: model.country,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    #[serde(default)]
    pub street: Patch<String>,
    #[serde(default)]
    pub city: Patch<String>,
    #[serde(default)]
    pub province: Patch<String>,
    #[serde(default)]
    pub postal_code: Patch<String>,
    #[serde(default)]
    pub country: Patch<String>,
}
