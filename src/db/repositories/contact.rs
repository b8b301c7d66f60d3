use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::entities::{addresses, contacts, prelude::*};
use crate::models::{ContactPatch, NewContact};

/// Repository for contacts. Reads are always scoped by owner.
pub struct ContactRepository {
    conn: DatabaseConnection,
}

impl ContactRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_for_user(
        &self,
        user_id: i32,
        contact_id: i32,
    ) -> Result<Option<contacts::Model>> {
        Contacts::find_by_id(contact_id)
            .filter(contacts::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query contact")
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<contacts::Model>> {
        Contacts::find()
            .filter(contacts::Column::UserId.eq(user_id))
            .order_by_asc(contacts::Column::FirstName)
            .order_by_asc(contacts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list contacts")
    }

    /// `input.first_name` must already be validated as present.
    pub async fn create(&self, user_id: i32, input: NewContact) -> Result<contacts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = contacts::ActiveModel {
            user_id: Set(user_id),
            first_name: Set(input.first_name.unwrap_or_default()),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert contact")
    }

    pub async fn update(
        &self,
        existing: contacts::Model,
        patch: ContactPatch,
    ) -> Result<contacts::Model> {
        let mut active: contacts::ActiveModel = existing.into();

        if let Some(Some(first_name)) = patch.first_name.into_update() {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = patch.last_name.into_update() {
            active.last_name = Set(last_name);
        }
        if let Some(email) = patch.email.into_update() {
            active.email = Set(email);
        }
        if let Some(phone) = patch.phone.into_update() {
            active.phone = Set(phone);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update contact")
    }

    /// Delete a contact and all of its addresses in one transaction.
    /// Returns the number of addresses removed.
    pub async fn delete_with_addresses(&self, contact_id: i32) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let removed = Addresses::delete_many()
            .filter(addresses::Column::ContactId.eq(contact_id))
            .exec(&txn)
            .await
            .context("Failed to delete contact addresses")?;

        Contacts::delete_by_id(contact_id)
            .exec(&txn)
            .await
            .context("Failed to delete contact")?;

        txn.commit().await?;

        debug!(
            contact_id,
            addresses = removed.rows_affected,
            "Deleted contact with its addresses"
        );
        Ok(removed.rows_affected)
    }
}
