//! `SeaORM` implementation of the contact and address services.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{AddressLocator, ContactId, Principal};
use crate::models::{
    AddressDto, AddressPatch, ContactDto, ContactPatch, NewAddress, NewContact,
};
use crate::services::contact_service::{
    ADDRESS_NOT_FOUND, AddressService, ContactError, ContactService,
};
use crate::services::ownership::OwnershipGuard;
use crate::services::validation::{
    self, MAX_ADDRESS_FIELD_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
};

pub struct SeaOrmContactService {
    store: Store,
    guard: OwnershipGuard,
}

impl SeaOrmContactService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        let guard = OwnershipGuard::new(store.clone());
        Self { store, guard }
    }
}

fn validate_new_contact(input: &NewContact) -> Result<(), String> {
    validation::required("first_name", input.first_name.as_deref(), MAX_NAME_LEN)?;
    validation::optional("last_name", input.last_name.as_deref(), MAX_NAME_LEN)?;
    validation::optional("email", input.email.as_deref(), MAX_EMAIL_LEN)?;
    validation::email("email", input.email.as_deref())?;
    validation::optional("phone", input.phone.as_deref(), MAX_PHONE_LEN)
}

fn validate_contact_patch(patch: &ContactPatch) -> Result<(), String> {
    validation::required_patch("first_name", &patch.first_name, MAX_NAME_LEN)?;
    validation::optional_patch("last_name", &patch.last_name, MAX_NAME_LEN)?;
    validation::optional_patch("email", &patch.email, MAX_EMAIL_LEN)?;
    validation::email("email", patch.email.as_value().map(String::as_str))?;
    validation::optional_patch("phone", &patch.phone, MAX_PHONE_LEN)
}

fn validate_new_address(input: &NewAddress) -> Result<(), String> {
    validation::optional("street", input.street.as_deref(), MAX_ADDRESS_FIELD_LEN)?;
    validation::optional("city", input.city.as_deref(), MAX_ADDRESS_FIELD_LEN)?;
    validation::optional("province", input.province.as_deref(), MAX_ADDRESS_FIELD_LEN)?;
    validation::optional("postal_code", input.postal_code.as_deref(), MAX_ADDRESS_FIELD_LEN)?;
    validation::required("country", input.country.as_deref(), MAX_ADDRESS_FIELD_LEN).map(|_| ())
}

fn validate_address_patch(patch: &AddressPatch) -> Result<(), String> {
    validation::optional_patch("street", &patch.street, MAX_ADDRESS_FIELD_LEN)?;
    validation::optional_patch("city", &patch.city, MAX_ADDRESS_FIELD_LEN)?;
    validation::optional_patch("province", &patch.province, MAX_ADDRESS_FIELD_LEN)?;
    validation::optional_patch("postal_code", &patch.postal_code, MAX_ADDRESS_FIELD_LEN)?;
    validation::required_patch("country", &patch.country, MAX_ADDRESS_FIELD_LEN)
}

#[async_trait]
impl ContactService for SeaOrmContactService {
    async fn list_contacts(&self, principal: &Principal) -> Result<Vec<ContactDto>, ContactError> {
        let contacts = self
            .store
            .list_contacts_for_user(principal.id.value())
            .await?;
        Ok(contacts.into_iter().map(ContactDto::from).collect())
    }

    async fn create_contact(
        &self,
        principal: &Principal,
        input: NewContact,
    ) -> Result<ContactDto, ContactError> {
        validate_new_contact(&input).map_err(ContactError::Validation)?;

        let contact = self
            .store
            .create_contact(principal.id.value(), input)
            .await?;

        info!(user_id = %principal.id, contact_id = contact.id, "Created contact");
        Ok(contact.into())
    }

    async fn get_contact(
        &self,
        principal: &Principal,
        id: ContactId,
    ) -> Result<ContactDto, ContactError> {
        let contact = self.guard.authorize_contact(principal, id).await?;
        Ok(contact.into())
    }

    async fn update_contact(
        &self,
        principal: &Principal,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<ContactDto, ContactError> {
        validate_contact_patch(&patch).map_err(ContactError::Validation)?;

        let existing = self.guard.authorize_contact(principal, id).await?;
        let contact = self.store.update_contact(existing, patch).await?;
        Ok(contact.into())
    }

    async fn delete_contact(
        &self,
        principal: &Principal,
        id: ContactId,
    ) -> Result<u64, ContactError> {
        let contact = self.guard.authorize_contact(principal, id).await?;
        let removed = self.store.delete_contact_with_addresses(contact.id).await?;

        info!(user_id = %principal.id, contact_id = contact.id, addresses = removed, "Deleted contact");
        Ok(removed)
    }
}

#[async_trait]
impl AddressService for SeaOrmContactService {
    async fn list_addresses(
        &self,
        principal: &Principal,
        contact_id: ContactId,
    ) -> Result<Vec<AddressDto>, ContactError> {
        let contact = self.guard.authorize_contact(principal, contact_id).await?;
        let addresses = self.store.list_addresses_for_contact(contact.id).await?;
        Ok(addresses.into_iter().map(AddressDto::from).collect())
    }

    async fn create_address(
        &self,
        principal: &Principal,
        contact_id: ContactId,
        input: NewAddress,
    ) -> Result<AddressDto, ContactError> {
        validate_new_address(&input).map_err(ContactError::Validation)?;

        let contact = self.guard.authorize_contact(principal, contact_id).await?;
        let address = self.store.create_address(contact.id, input).await?;

        info!(user_id = %principal.id, contact_id = contact.id, address_id = address.id, "Created address");
        Ok(address.into())
    }

    async fn get_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
    ) -> Result<AddressDto, ContactError> {
        let (_, address) = self.guard.authorize_address(principal, locator).await?;
        Ok(address.into())
    }

    async fn update_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
        patch: AddressPatch,
    ) -> Result<AddressDto, ContactError> {
        validate_address_patch(&patch).map_err(ContactError::Validation)?;

        let (_, existing) = self.guard.authorize_address(principal, locator).await?;
        let address = self.store.update_address(existing, patch).await?;
        Ok(address.into())
    }

    async fn delete_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
    ) -> Result<(), ContactError> {
        let (contact, address) = self.guard.authorize_address(principal, locator).await?;

        if !self.store.delete_address(address.id).await? {
            return Err(ContactError::NotFound(ADDRESS_NOT_FOUND.to_string()));
        }

        info!(user_id = %principal.id, contact_id = contact.id, address_id = address.id, "Deleted address");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Patch, UserId};
    use crate::services::contact_service::CONTACT_NOT_FOUND;

    async fn setup() -> (SeaOrmContactService, Principal, Principal) {
        let store = Store::in_memory().await.unwrap();
        let a = store.create_user("alice", "x".into(), "Alice").await.unwrap().unwrap();
        let b = store.create_user("bob", "x".into(), "Bob").await.unwrap().unwrap();
        let alice = Principal {
            id: UserId::new(a.id),
            username: a.username,
            name: a.name,
        };
        let bob = Principal {
            id: UserId::new(b.id),
            username: b.username,
            name: b.name,
        };
        (SeaOrmContactService::new(store), alice, bob)
    }

    fn john() -> NewContact {
        NewContact {
            first_name: Some("John".into()),
            last_name: Some("Doe".into()),
            email: Some("john@x.com".into()),
            phone: Some("555".into()),
        }
    }

    fn country(code: &str) -> NewAddress {
        NewAddress {
            country: Some(code.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_preserves_fields() {
        let (svc, alice, _) = setup().await;
        let created = svc.create_contact(&alice, john()).await.unwrap();
        let fetched = svc.get_contact(&alice, created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.first_name, "John");
        assert_eq!(fetched.last_name.as_deref(), Some("Doe"));
        assert_eq!(fetched.email.as_deref(), Some("john@x.com"));
        assert_eq!(fetched.phone.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn test_create_requires_first_name() {
        let (svc, alice, _) = setup().await;
        let err = svc
            .create_contact(&alice, NewContact::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::Validation(msg) if msg.contains("first name")));
        assert!(svc.list_contacts(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let (svc, alice, _) = setup().await;
        let mut input = john();
        input.email = Some("not-an-email".into());
        assert!(matches!(
            svc.create_contact(&alice, input).await,
            Err(ContactError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_email_only_touches_email() {
        let (svc, alice, _) = setup().await;
        let created = svc.create_contact(&alice, john()).await.unwrap();

        let patch = ContactPatch {
            email: Patch::Value("j@y.org".into()),
            ..Default::default()
        };
        let updated = svc.update_contact(&alice, created.id, patch).await.unwrap();

        assert_eq!(updated.email.as_deref(), Some("j@y.org"));
        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.last_name, created.last_name);
        assert_eq!(updated.phone, created.phone);
    }

    #[tokio::test]
    async fn test_update_null_clears_optional_field() {
        let (svc, alice, _) = setup().await;
        let created = svc.create_contact(&alice, john()).await.unwrap();

        let patch = ContactPatch {
            phone: Patch::Null,
            ..Default::default()
        };
        let updated = svc.update_contact(&alice, created.id, patch).await.unwrap();
        assert_eq!(updated.phone, None);

        let patch = ContactPatch {
            first_name: Patch::Null,
            ..Default::default()
        };
        assert!(matches!(
            svc.update_contact(&alice, created.id, patch).await,
            Err(ContactError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_other_user_sees_not_found() {
        let (svc, alice, bob) = setup().await;
        let created = svc.create_contact(&alice, john()).await.unwrap();

        let get = svc.get_contact(&bob, created.id).await.unwrap_err();
        assert!(matches!(get, ContactError::NotFound(ref msg) if msg == CONTACT_NOT_FOUND));
        assert!(
            svc.update_contact(&bob, created.id, ContactPatch::default())
                .await
                .is_err()
        );
        assert!(svc.delete_contact(&bob, created.id).await.is_err());
        assert!(svc.list_contacts(&bob).await.unwrap().is_empty());

        // Still intact for the owner.
        assert!(svc.get_contact(&alice, created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_contact_takes_addresses() {
        let (svc, alice, _) = setup().await;
        let contact = svc.create_contact(&alice, john()).await.unwrap();
        let address = svc
            .create_address(&alice, contact.id, country("NL"))
            .await
            .unwrap();
        svc.create_address(&alice, contact.id, country("BE"))
            .await
            .unwrap();

        assert_eq!(svc.delete_contact(&alice, contact.id).await.unwrap(), 2);
        assert_eq!(
            svc.store
                .count_addresses_for_contact(contact.id.value())
                .await
                .unwrap(),
            0
        );
        assert!(
            svc.get_address(&alice, AddressLocator::Bare(address.id))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_address_with_only_country() {
        let (svc, alice, _) = setup().await;
        let contact = svc.create_contact(&alice, john()).await.unwrap();
        let address = svc
            .create_address(&alice, contact.id, country("Indonesia"))
            .await
            .unwrap();

        assert_eq!(address.country, "Indonesia");
        assert_eq!(address.street, None);
        assert_eq!(address.city, None);
        assert_eq!(address.province, None);
        assert_eq!(address.postal_code, None);
    }

    #[tokio::test]
    async fn test_address_requires_country() {
        let (svc, alice, _) = setup().await;
        let contact = svc.create_contact(&alice, john()).await.unwrap();
        let err = svc
            .create_address(&alice, contact.id, NewAddress::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::Validation(msg) if msg.contains("country")));
    }

    #[tokio::test]
    async fn test_address_under_foreign_contact() {
        let (svc, alice, bob) = setup().await;
        let contact = svc.create_contact(&alice, john()).await.unwrap();
        let address = svc
            .create_address(&alice, contact.id, country("NL"))
            .await
            .unwrap();

        assert!(
            svc.create_address(&bob, contact.id, country("FR"))
                .await
                .is_err()
        );
        assert!(svc.list_addresses(&bob, contact.id).await.is_err());
        assert!(
            svc.delete_address(&bob, AddressLocator::nested(contact.id, address.id))
                .await
                .is_err()
        );
        assert!(
            svc.delete_address(&bob, AddressLocator::Bare(address.id))
                .await
                .is_err()
        );
        assert_eq!(svc.list_addresses(&alice, contact.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_address_update_and_delete() {
        let (svc, alice, _) = setup().await;
        let contact = svc.create_contact(&alice, john()).await.unwrap();
        let address = svc
            .create_address(&alice, contact.id, country("NL"))
            .await
            .unwrap();
        let locator = AddressLocator::nested(contact.id, address.id);

        let patch = AddressPatch {
            city: Patch::Value("Utrecht".into()),
            ..Default::default()
        };
        let updated = svc.update_address(&alice, locator, patch).await.unwrap();
        assert_eq!(updated.city.as_deref(), Some("Utrecht"));
        assert_eq!(updated.country, "NL");

        svc.delete_address(&alice, locator).await.unwrap();
        let err = svc.get_address(&alice, locator).await.unwrap_err();
        assert!(matches!(err, ContactError::NotFound(msg) if msg == ADDRESS_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_address_from_another_contact_is_not_found() {
        let (svc, alice, _) = setup().await;
        let first = svc.create_contact(&alice, john()).await.unwrap();
        let second = svc.create_contact(&alice, john()).await.unwrap();
        let address = svc
            .create_address(&alice, first.id, country("NL"))
            .await
            .unwrap();

        let err = svc
            .get_address(&alice, AddressLocator::nested(second.id, address.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound(msg) if msg == ADDRESS_NOT_FOUND));
    }
}
