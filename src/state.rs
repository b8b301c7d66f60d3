use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AddressService, AuthService, ContactService, SeaOrmAuthService, SeaOrmContactService,
};

/// Long-lived handles shared by every request.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub contact_service: Arc<dyn ContactService>,

    pub address_service: Arc<dyn AddressService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already opened store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        // One instance implements both traits.
        let contacts = Arc::new(SeaOrmContactService::new(store.clone()));
        let contact_service = contacts.clone() as Arc<dyn ContactService>;
        let address_service = contacts as Arc<dyn AddressService>;

        info!("Services initialized");

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            contact_service,
            address_service,
        }
    }
}
