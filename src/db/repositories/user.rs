use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user. The caller hashes the password.
    ///
    /// Returns `None` when the username unique index rejects the row, which
    /// covers a concurrent registration that passed [`Self::username_exists`].
    pub async fn create(
        &self,
        username: &str,
        password_hash: String,
        name: &str,
    ) -> Result<Option<users::Model>> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            name: Set(name.to_string()),
            token: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert user")),
        }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    /// Resolve the user currently holding `token`
    pub async fn get_by_token(&self, token: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query user by token")
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    /// Replace (or clear) the stored bearer token
    pub async fn set_token(&self, id: i32, token: Option<String>) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for token update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.token = Set(token);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Update display name and/or password hash; `None` leaves the column alone.
    pub async fn update_profile(
        &self,
        id: i32,
        name: Option<String>,
        password_hash: Option<String>,
    ) -> Result<users::Model> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(hash) = password_hash {
            active.password_hash = Set(hash);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
/// CPU-heavy: call through [`hash_password_blocking`] from async code.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Check `password` against a stored PHC string. The cost parameters are read
/// from the hash itself, so hashes made under older settings still verify.
pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Generate a random bearer token (256 bits, 64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn test_generate_token_shape() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password_blocking("s3cret", &fast_params()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("s3cret"));
        assert!(verify_password(&hash, "s3cret").await.unwrap());
        assert!(!verify_password(&hash, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let a = hash_password_blocking("pw", &fast_params()).await.unwrap();
        let b = hash_password_blocking("pw", &fast_params()).await.unwrap();
        assert_ne!(a, b);
    }
}
