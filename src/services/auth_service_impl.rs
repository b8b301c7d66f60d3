//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::{Store, generate_token, hash_password_blocking, verify_password};
use crate::domain::{Principal, UserId};
use crate::entities::users;
use crate::models::{Credentials, LoginResult, NewUser, UserDto, UserPatch};
use crate::services::auth_service::{
    AuthError, AuthService, INVALID_TOKEN, TOKEN_REQUIRED, parse_bearer,
};
use crate::services::validation::{self, MAX_NAME_LEN};

pub const USER_NOT_FOUND: &str = "User not found";
pub const USERNAME_TAKEN: &str = "The username has already been taken.";

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_password_blocking(password, &self.security)
            .await
            .map_err(|e| AuthError::Internal(format!("{e:#}")))
    }
}

fn principal_of(user: users::Model) -> Principal {
    Principal {
        id: UserId::new(user.id),
        username: user.username,
        name: user.name,
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, input: NewUser) -> Result<UserDto, AuthError> {
        let username = validation::required("username", input.username.as_deref(), MAX_NAME_LEN)
            .map_err(AuthError::Validation)?;
        let password = validation::required("password", input.password.as_deref(), MAX_NAME_LEN)
            .map_err(AuthError::Validation)?;
        let name = validation::required("name", input.name.as_deref(), MAX_NAME_LEN)
            .map_err(AuthError::Validation)?;

        if self.store.username_exists(username).await? {
            return Err(AuthError::Validation(USERNAME_TAKEN.to_string()));
        }

        let hash = self.hash(password).await?;
        let Some(user) = self.store.create_user(username, hash, name).await? else {
            debug!(%username, "Lost registration race for username");
            return Err(AuthError::Validation(USERNAME_TAKEN.to_string()));
        };

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user.into())
    }

    async fn login(&self, credentials: Credentials) -> Result<LoginResult, AuthError> {
        let username =
            validation::required("username", credentials.username.as_deref(), MAX_NAME_LEN)
                .map_err(AuthError::Validation)?;
        let password =
            validation::required("password", credentials.password.as_deref(), MAX_NAME_LEN)
                .map_err(AuthError::Validation)?;

        let Some(user) = self.store.get_user_by_username(username).await? else {
            debug!(%username, "Login for unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let is_valid = verify_password(&user.password_hash, password)
            .await
            .map_err(|e| AuthError::Internal(format!("{e:#}")))?;
        if !is_valid {
            debug!(user_id = user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        self.store.set_user_token(user.id, Some(token.clone())).await?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginResult {
            user: user.into(),
            token,
        })
    }

    async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = authorization
            .and_then(parse_bearer)
            .ok_or_else(|| AuthError::Unauthenticated(TOKEN_REQUIRED.to_string()))?;

        self.store
            .get_user_by_token(token)
            .await?
            .map(principal_of)
            .ok_or_else(|| AuthError::Unauthenticated(INVALID_TOKEN.to_string()))
    }

    async fn logout(&self, principal: &Principal) -> Result<(), AuthError> {
        self.store.set_user_token(principal.id.value(), None).await?;
        info!(user_id = %principal.id, "User logged out");
        Ok(())
    }

    async fn current_user(&self, principal: &Principal) -> Result<UserDto, AuthError> {
        Ok(UserDto::from(principal))
    }

    async fn get_user(&self, principal: &Principal, id: UserId) -> Result<UserDto, AuthError> {
        if id != principal.id {
            return Err(AuthError::NotFound(USER_NOT_FOUND.to_string()));
        }

        self.store
            .get_user(id.value())
            .await?
            .map(UserDto::from)
            .ok_or_else(|| AuthError::NotFound(USER_NOT_FOUND.to_string()))
    }

    async fn update_user(
        &self,
        principal: &Principal,
        patch: UserPatch,
    ) -> Result<UserDto, AuthError> {
        validation::required_patch("name", &patch.name, MAX_NAME_LEN)
            .map_err(AuthError::Validation)?;
        validation::required_patch("password", &patch.password, MAX_NAME_LEN)
            .map_err(AuthError::Validation)?;

        let name = patch.name.into_update().flatten();
        let password_hash = match patch.password.as_value() {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        let user = self
            .store
            .update_user_profile(principal.id.value(), name, password_hash)
            .await?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Patch;

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    async fn service() -> SeaOrmAuthService {
        let store = Store::in_memory().await.unwrap();
        SeaOrmAuthService::new(store, fast_security())
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: Some(username.to_string()),
            password: Some("secret".to_string()),
            name: Some("Alice".to_string()),
        }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let svc = service().await;
        svc.register(new_user("alice")).await.unwrap();

        let err = svc.register(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(msg) if msg == USERNAME_TAKEN));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_duplicate_register_is_validation_error() {
        let db_path = std::env::temp_dir()
            .join(format!("rolodex-register-race-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        let svc = SeaOrmAuthService::new(store, fast_security());

        let (a, b) = tokio::join!(svc.register(new_user("alice")), svc.register(new_user("alice")));

        let (ok, err) = match (a, b) {
            (Ok(user), Err(err)) | (Err(err), Ok(user)) => (user, err),
            other => panic!("expected exactly one registration to win, got {other:?}"),
        };
        assert_eq!(ok.username, "alice");
        assert!(matches!(err, AuthError::Validation(msg) if msg == USERNAME_TAKEN));

        let _ = std::fs::remove_file(&db_path);
    }

    #[tokio::test]
    async fn test_register_requires_password() {
        let svc = service().await;
        let mut input = new_user("alice");
        input.password = None;

        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(msg) if msg.contains("password")));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service().await;
        svc.register(new_user("alice")).await.unwrap();

        let wrong_password = svc.login(credentials("alice", "nope")).await.unwrap_err();
        let unknown_user = svc.login(credentials("bob", "secret")).await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_relogin_revokes_previous_token() {
        let svc = service().await;
        svc.register(new_user("alice")).await.unwrap();

        let first = svc.login(credentials("alice", "secret")).await.unwrap();
        let second = svc.login(credentials("alice", "secret")).await.unwrap();
        assert_ne!(first.token, second.token);

        let header = format!("Bearer {}", first.token);
        let err = svc.authenticate(Some(&header)).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(msg) if msg == INVALID_TOKEN));

        let principal = svc.authenticate(Some(&second.token)).await.unwrap();
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_header_requires_token() {
        let svc = service().await;
        let err = svc.authenticate(None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(msg) if msg == TOKEN_REQUIRED));
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let svc = service().await;
        svc.register(new_user("alice")).await.unwrap();
        let login = svc.login(credentials("alice", "secret")).await.unwrap();
        let principal = svc.authenticate(Some(&login.token)).await.unwrap();

        svc.logout(&principal).await.unwrap();
        assert!(svc.authenticate(Some(&login.token)).await.is_err());
    }

    #[tokio::test]
    async fn test_get_user_only_sees_self() {
        let svc = service().await;
        let alice = svc.register(new_user("alice")).await.unwrap();
        let bob = svc.register(new_user("bob")).await.unwrap();
        let login = svc.login(credentials("alice", "secret")).await.unwrap();
        let principal = svc.authenticate(Some(&login.token)).await.unwrap();

        assert_eq!(svc.get_user(&principal, alice.id).await.unwrap(), alice);
        let err = svc.get_user(&principal, bob.id).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(msg) if msg == USER_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_update_user_password_keeps_session() {
        let svc = service().await;
        svc.register(new_user("alice")).await.unwrap();
        let login = svc.login(credentials("alice", "secret")).await.unwrap();
        let principal = svc.authenticate(Some(&login.token)).await.unwrap();

        let patch = UserPatch {
            name: Patch::Value("Alice Liddell".to_string()),
            password: Patch::Value("changed".to_string()),
        };
        let updated = svc.update_user(&principal, patch).await.unwrap();
        assert_eq!(updated.name, "Alice Liddell");

        assert!(svc.authenticate(Some(&login.token)).await.is_ok());
        assert!(svc.login(credentials("alice", "secret")).await.is_err());
        assert!(svc.login(credentials("alice", "changed")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_user_rejects_null_name() {
        let svc = service().await;
        svc.register(new_user("alice")).await.unwrap();
        let login = svc.login(credentials("alice", "secret")).await.unwrap();
        let principal = svc.authenticate(Some(&login.token)).await.unwrap();

        let patch = UserPatch {
            name: Patch::Null,
            password: Patch::Missing,
        };
        assert!(matches!(
            svc.update_user(&principal, patch).await,
            Err(AuthError::Validation(_))
        ));
    }
}
