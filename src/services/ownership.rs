//! Ownership checks for contacts and addresses.
//!
//! Every lookup is scoped by the principal's id in the query itself, so a
//! contact owned by someone else and a contact that does not exist produce
//! the same `NotFound`.

use tracing::debug;

use crate::db::Store;
use crate::domain::{AddressLocator, ContactId, Principal};
use crate::entities::{addresses, contacts};
use crate::services::contact_service::{ADDRESS_NOT_FOUND, CONTACT_NOT_FOUND, ContactError};

#[derive(Clone)]
pub struct OwnershipGuard {
    store: Store,
}

impl OwnershipGuard {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Returns the contact if it belongs to `principal`.
    pub async fn authorize_contact(
        &self,
        principal: &Principal,
        contact_id: ContactId,
    ) -> Result<contacts::Model, ContactError> {
        self.store
            .find_contact_for_user(principal.id.value(), contact_id.value())
            .await?
            .ok_or_else(|| {
                debug!(user_id = %principal.id, %contact_id, "Contact lookup denied");
                ContactError::NotFound(CONTACT_NOT_FOUND.to_string())
            })
    }

    /// Returns the address together with its parent contact.
    ///
    /// A nested locator checks the contact first and reports
    /// "Contact not found" when that fails. A bare address id reports
    /// "Address not found" for any miss.
    pub async fn authorize_address(
        &self,
        principal: &Principal,
        locator: AddressLocator,
    ) -> Result<(contacts::Model, addresses::Model), ContactError> {
        match locator {
            AddressLocator::Nested {
                contact_id,
                address_id,
            } => {
                let contact = self.authorize_contact(principal, contact_id).await?;
                let address = self
                    .store
                    .find_address_for_contact(contact.id, address_id.value())
                    .await?
                    .ok_or_else(|| ContactError::NotFound(ADDRESS_NOT_FOUND.to_string()))?;
                Ok((contact, address))
            }
            AddressLocator::Bare(address_id) => {
                let not_found = || ContactError::NotFound(ADDRESS_NOT_FOUND.to_string());

                let address = self
                    .store
                    .find_address(address_id.value())
                    .await?
                    .ok_or_else(not_found)?;
                let contact = self
                    .store
                    .find_contact_for_user(principal.id.value(), address.contact_id)
                    .await?
                    .ok_or_else(|| {
                        debug!(user_id = %principal.id, %address_id, "Address lookup denied");
                        not_found()
                    })?;
                Ok((contact, address))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressId, UserId};
    use crate::models::{NewAddress, NewContact};

    struct Fixture {
        guard: OwnershipGuard,
        alice: Principal,
        bob: Principal,
        contact: contacts::Model,
        address: addresses::Model,
    }

    async fn fixture() -> Fixture {
        let store = Store::in_memory().await.unwrap();
        let a = store.create_user("alice", "x".into(), "Alice").await.unwrap().unwrap();
        let b = store.create_user("bob", "x".into(), "Bob").await.unwrap().unwrap();

        let contact = store
            .create_contact(
                a.id,
                NewContact {
                    first_name: Some("Carol".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let address = store
            .create_address(
                contact.id,
                NewAddress {
                    country: Some("NL".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let principal = |u: &crate::entities::users::Model| Principal {
            id: UserId::new(u.id),
            username: u.username.clone(),
            name: u.name.clone(),
        };

        Fixture {
            guard: OwnershipGuard::new(store),
            alice: principal(&a),
            bob: principal(&b),
            contact,
            address,
        }
    }

    #[tokio::test]
    async fn test_owner_passes() {
        let f = fixture().await;
        let contact_id = ContactId::new(f.contact.id);
        let address_id = AddressId::new(f.address.id);

        let got = f.guard.authorize_contact(&f.alice, contact_id).await.unwrap();
        assert_eq!(got.id, f.contact.id);

        let (_, addr) = f
            .guard
            .authorize_address(&f.alice, AddressLocator::nested(contact_id, address_id))
            .await
            .unwrap();
        assert_eq!(addr.id, f.address.id);

        let (parent, _) = f
            .guard
            .authorize_address(&f.alice, AddressLocator::Bare(address_id))
            .await
            .unwrap();
        assert_eq!(parent.id, f.contact.id);
    }

    #[tokio::test]
    async fn test_foreign_and_missing_look_the_same() {
        let f = fixture().await;

        let foreign = f
            .guard
            .authorize_contact(&f.bob, ContactId::new(f.contact.id))
            .await
            .unwrap_err();
        let missing = f
            .guard
            .authorize_contact(&f.alice, ContactId::new(9999))
            .await
            .unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_nested_reports_contact_first() {
        let f = fixture().await;
        let locator =
            AddressLocator::nested(ContactId::new(f.contact.id), AddressId::new(f.address.id));

        let err = f.guard.authorize_address(&f.bob, locator).await.unwrap_err();
        assert!(matches!(err, ContactError::NotFound(msg) if msg == CONTACT_NOT_FOUND));

        let wrong_address =
            AddressLocator::nested(ContactId::new(f.contact.id), AddressId::new(9999));
        let err = f
            .guard
            .authorize_address(&f.alice, wrong_address)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound(msg) if msg == ADDRESS_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_bare_locator_hides_parent() {
        let f = fixture().await;
        let err = f
            .guard
            .authorize_address(&f.bob, AddressLocator::Bare(AddressId::new(f.address.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound(msg) if msg == ADDRESS_NOT_FOUND));
    }
}
