use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{addresses, contacts, users};
use crate::models::{AddressPatch, ContactPatch, NewAddress, NewContact};

pub mod migrator;
pub mod repositories;

pub use repositories::user::{generate_token, hash_password_blocking, verify_password};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Single-connection in-memory store, used by tests and `check-config`.
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_options("sqlite::memory:", 1, 1).await
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn contact_repo(&self) -> repositories::contact::ContactRepository {
        repositories::contact::ContactRepository::new(self.conn.clone())
    }

    fn address_repo(&self) -> repositories::address::AddressRepository {
        repositories::address::AddressRepository::new(self.conn.clone())
    }

    /// `None` when the username is already taken.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: String,
        name: &str,
    ) -> Result<Option<users::Model>> {
        self.user_repo().create(username, password_hash, name).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_token(token).await
    }

    pub async fn set_user_token(&self, id: i32, token: Option<String>) -> Result<()> {
        self.user_repo().set_token(id, token).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        name: Option<String>,
        password_hash: Option<String>,
    ) -> Result<users::Model> {
        self.user_repo()
            .update_profile(id, name, password_hash)
            .await
    }

    pub async fn find_contact_for_user(
        &self,
        user_id: i32,
        contact_id: i32,
    ) -> Result<Option<contacts::Model>> {
        self.contact_repo()
            .find_for_user(user_id, contact_id)
            .await
    }

    pub async fn list_contacts_for_user(&self, user_id: i32) -> Result<Vec<contacts::Model>> {
        self.contact_repo().list_for_user(user_id).await
    }

    pub async fn create_contact(
        &self,
        user_id: i32,
        input: NewContact,
    ) -> Result<contacts::Model> {
        self.contact_repo().create(user_id, input).await
    }

    pub async fn update_contact(
        &self,
        existing: contacts::Model,
        patch: ContactPatch,
    ) -> Result<contacts::Model> {
        self.contact_repo().update(existing, patch).await
    }

    pub async fn delete_contact_with_addresses(&self, contact_id: i32) -> Result<u64> {
        self.contact_repo().delete_with_addresses(contact_id).await
    }

    pub async fn find_address_for_contact(
        &self,
        contact_id: i32,
        address_id: i32,
    ) -> Result<Option<addresses::Model>> {
        self.address_repo()
            .find_for_contact(contact_id, address_id)
            .await
    }

    pub async fn find_address(&self, address_id: i32) -> Result<Option<addresses::Model>> {
        self.address_repo().find_by_id(address_id).await
    }

    pub async fn list_addresses_for_contact(
        &self,
        contact_id: i32,
    ) -> Result<Vec<addresses::Model>> {
        self.address_repo().list_for_contact(contact_id).await
    }

    pub async fn count_addresses_for_contact(&self, contact_id: i32) -> Result<u64> {
        self.address_repo().count_for_contact(contact_id).await
    }

    pub async fn create_address(
        &self,
        contact_id: i32,
        input: NewAddress,
    ) -> Result<addresses::Model> {
        self.address_repo().create(contact_id, input).await
    }

    pub async fn update_address(
        &self,
        existing: addresses::Model,
        patch: AddressPatch,
    ) -> Result<addresses::Model> {
        self.address_repo().update(existing, patch).await
    }

    pub async fn delete_address(&self, address_id: i32) -> Result<bool> {
        self.address_repo().delete(address_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (Store, users::Model) {
        let store = Store::in_memory().await.unwrap();
        let user = store
            .create_user("alice", "not-a-real-hash".to_string(), "Alice")
            .await
            .unwrap()
            .unwrap();
        (store, user)
    }

    fn contact(first_name: &str) -> NewContact {
        NewContact {
            first_name: Some(first_name.to_string()),
            ..Default::default()
        }
    }

    fn address(country: &str) -> NewAddress {
        NewAddress {
            country: Some(country.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_contacts_are_listed_by_first_name() {
        let (store, user) = seeded().await;
        for name in ["Zed", "Anna", "Mike"] {
            store.create_contact(user.id, contact(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list_contacts_for_user(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.first_name)
            .collect();
        assert_eq!(names, vec!["Anna", "Mike", "Zed"]);
    }

    #[tokio::test]
    async fn test_contact_lookup_is_scoped_to_owner() {
        let (store, alice) = seeded().await;
        let bob = store
            .create_user("bob", "x".to_string(), "Bob")
            .await
            .unwrap()
            .unwrap();
        let c = store.create_contact(alice.id, contact("John")).await.unwrap();

        assert!(
            store
                .find_contact_for_user(alice.id, c.id)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .find_contact_for_user(bob.id, c.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_contact_removes_addresses() {
        let (store, user) = seeded().await;
        let c = store.create_contact(user.id, contact("John")).await.unwrap();
        store.create_address(c.id, address("USA")).await.unwrap();
        store.create_address(c.id, address("Canada")).await.unwrap();

        let removed = store.delete_contact_with_addresses(c.id).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count_addresses_for_contact(c.id).await.unwrap(), 0);
        assert!(
            store
                .find_contact_for_user(user.id, c.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_addresses_are_listed_in_creation_order() {
        let (store, user) = seeded().await;
        let c = store.create_contact(user.id, contact("John")).await.unwrap();
        let first = store.create_address(c.id, address("B")).await.unwrap();
        let second = store.create_address(c.id, address("A")).await.unwrap();

        let ids: Vec<i32> = store
            .list_addresses_for_contact(c.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_token_lookup_follows_latest_token() {
        let (store, user) = seeded().await;
        store
            .set_user_token(user.id, Some("t1".to_string()))
            .await
            .unwrap();
        store
            .set_user_token(user.id, Some("t2".to_string()))
            .await
            .unwrap();

        assert!(store.get_user_by_token("t1").await.unwrap().is_none());
        assert_eq!(
            store.get_user_by_token("t2").await.unwrap().map(|u| u.id),
            Some(user.id)
        );
    }
}
