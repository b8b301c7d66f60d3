use crate::config::Config;
use crate::db::Store;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Config file created. Edit config.toml and run again.");
    } else {
        println!("Config file already exists, leaving it untouched.");
    }
    Ok(())
}

pub async fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    println!("✓ Configuration is valid");
    println!("  Database:  {}", config.general.database_path);
    println!(
        "  Listen:    {}:{}",
        config.server.bind_address, config.server.port
    );
    println!(
        "  Log:       {} ({})",
        config.general.log_level, config.general.log_format
    );
    println!(
        "  Metrics:   {}",
        if config.observability.metrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let store = Store::with_pool_options(&config.general.database_path, 1, 1).await?;
    store.ping().await?;
    println!("✓ Database reachable, migrations applied");

    Ok(())
}
