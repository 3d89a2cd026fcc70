use crate::accounts::Lifetime;
use crate::config::Config;
use crate::services::AccountService;

use super::{close_service, open_service};

pub async fn cmd_renew_account(
    config: &Config,
    username: &str,
    lifetime: Lifetime,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = service.renew_account(username, lifetime).await;
    close_service(service).await;
    let account = result?;

    println!(
        "✓ Renewed {} until {} (renewal #{})",
        account.user, account.expiration_date, account.renew_counter
    );
    Ok(())
}

pub async fn cmd_activate_account(config: &Config, username: &str) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = service.activate_account(username).await;
    close_service(service).await;

    if result? {
        println!("Account {username} is still deactivated.");
    } else {
        println!("✓ Activated {username}");
    }
    Ok(())
}

pub async fn cmd_deactivate_account(config: &Config, username: &str) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = service.deactivate_account(username).await;
    close_service(service).await;

    if result? {
        println!("✓ Deactivated {username}");
    } else {
        println!("Account {username} is still active.");
    }
    Ok(())
}
