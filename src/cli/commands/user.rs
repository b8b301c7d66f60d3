use crate::config::Config;
use crate::db::Store;
use crate::models::NewUser;
use crate::services::{AuthService, SeaOrmAuthService};

pub async fn cmd_create_user(
    config: &Config,
    username: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    let user = auth
        .register(NewUser {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
        })
        .await?;

    println!("✓ Created user '{}' (id {})", user.username, user.id);
    Ok(())
}
