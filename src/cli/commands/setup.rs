use std::path::Path;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_init(path: &Path) -> anyhow::Result<()> {
    if Config::create_default_if_missing(path)? {
        println!("✓ Config file created at {}.", path.display());
        println!("Fill in the [database] section and run 'ftpaccounts init-db'.");
    } else {
        println!("Config file {} already exists, leaving it alone.", path.display());
    }
    Ok(())
}

pub async fn cmd_init_db(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    let store = Store::create(&config.database).await?;
    store.init_tables().await?;
    store.close().await;

    println!("✓ users table is ready.");
    Ok(())
}

pub async fn cmd_ping(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    let store = Store::connect(&config.database).await?;
    store.ping().await?;
    store.close().await;

    println!("✓ Database is reachable.");
    Ok(())
}
