use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{addresses, prelude::*};
use crate::models::{AddressPatch, NewAddress};

/// Repository for addresses. Callers pass an already authorized contact id.
pub struct AddressRepository {
    conn: DatabaseConnection,
}

impl AddressRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_for_contact(
        &self,
        contact_id: i32,
        address_id: i32,
    ) -> Result<Option<addresses::Model>> {
        Addresses::find_by_id(address_id)
            .filter(addresses::Column::ContactId.eq(contact_id))
            .one(&self.conn)
            .await
            .context("Failed to query address")
    }

    /// Unscoped lookup. Only the ownership guard uses this, to find the parent
    /// contact it must then check.
    pub async fn find_by_id(&self, address_id: i32) -> Result<Option<addresses::Model>> {
        Addresses::find_by_id(address_id)
            .one(&self.conn)
            .await
            .context("Failed to query address by ID")
    }

    pub async fn list_for_contact(&self, contact_id: i32) -> Result<Vec<addresses::Model>> {
        Addresses::find()
            .filter(addresses::Column::ContactId.eq(contact_id))
            .order_by_asc(addresses::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list addresses")
    }

    pub async fn count_for_contact(&self, contact_id: i32) -> Result<u64> {
        Addresses::find()
            .filter(addresses::Column::ContactId.eq(contact_id))
            .count(&self.conn)
            .await
            .context("Failed to count addresses")
    }

    /// `input.country` must already be validated as present.
    pub async fn create(&self, contact_id: i32, input: NewAddress) -> Result<addresses::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = addresses::ActiveModel {
            contact_id: Set(contact_id),
            street: Set(input.street),
            city: Set(input.city),
            province: Set(input.province),
            postal_code: Set(input.postal_code),
            country: Set(input.country.unwrap_or_default()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert address")
    }

    pub async fn update(
        &self,
        existing: addresses::Model,
        patch: AddressPatch,
    ) -> Result<addresses::Model> {
        let mut active: addresses::ActiveModel = existing.into();

        if let Some(street) = patch.street.into_update() {
            active.street = Set(street);
        }
        if let Some(city) = patch.city.into_update() {
            active.city = Set(city);
        }
        if let Some(province) = patch.province.into_update() {
            active.province = Set(province);
        }
        if let Some(postal_code) = patch.postal_code.into_update() {
            active.postal_code = Set(postal_code);
        }
        if let Some(Some(country)) = patch.country.into_update() {
            active.country = Set(country);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update address")
    }

    pub async fn delete(&self, address_id: i32) -> Result<bool> {
        let result = Addresses::delete_by_id(address_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete address")?;

        Ok(result.rows_affected > 0)
    }
}
