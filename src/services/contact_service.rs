//! Domain service for contacts and their addresses.

use thiserror::Error;

use crate::domain::{AddressLocator, ContactId, Principal};
use crate::models::{
    AddressDto, AddressPatch, ContactDto, ContactPatch, NewAddress, NewContact,
};

pub const CONTACT_NOT_FOUND: &str = "Contact not found";
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

#[derive(Debug, Error)]
pub enum ContactError {
    /// Missing, or owned by somebody else.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ContactError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ContactError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Contacts owned by the principal.
#[async_trait::async_trait]
pub trait ContactService: Send + Sync {
    /// Ordered by first name, ties broken by id.
    async fn list_contacts(&self, principal: &Principal) -> Result<Vec<ContactDto>, ContactError>;

    async fn create_contact(
        &self,
        principal: &Principal,
        input: NewContact,
    ) -> Result<ContactDto, ContactError>;

    async fn get_contact(
        &self,
        principal: &Principal,
        id: ContactId,
    ) -> Result<ContactDto, ContactError>;

    async fn update_contact(
        &self,
        principal: &Principal,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<ContactDto, ContactError>;

    /// Removes the contact and every address under it.
    /// Returns how many addresses went with it.
    async fn delete_contact(&self, principal: &Principal, id: ContactId)
    -> Result<u64, ContactError>;
}

/// Addresses, always reached through a contact the principal owns.
#[async_trait::async_trait]
pub trait AddressService: Send + Sync {
    async fn list_addresses(
        &self,
        principal: &Principal,
        contact_id: ContactId,
    ) -> Result<Vec<AddressDto>, ContactError>;

    async fn create_address(
        &self,
        principal: &Principal,
        contact_id: ContactId,
        input: NewAddress,
    ) -> Result<AddressDto, ContactError>;

    async fn get_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
    ) -> Result<AddressDto, ContactError>;

    async fn update_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
        patch: AddressPatch,
    ) -> Result<AddressDto, ContactError>;

    async fn delete_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
    ) -> Result<(), ContactError>;
}
