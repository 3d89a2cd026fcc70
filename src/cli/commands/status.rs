use crate::config::Config;
use crate::services::AccountService;

use super::{close_service, open_service};

pub async fn cmd_account_status(config: &Config, username: &str) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = async {
        let deactivated = service.is_account_deactivated(username).await?;
        let expired = service.is_account_expired(username).await?;
        Ok::<_, crate::services::AccountError>((deactivated, expired))
    }
    .await;
    close_service(service).await;
    let (deactivated, expired) = result?;

    let usable = !deactivated && !expired;
    println!("Account:     {username}");
    println!("Deactivated: {}", if deactivated { "Yes" } else { "No" });
    println!("Expired:     {}", if expired { "Yes" } else { "No" });
    println!("Can log in:  {}", if usable { "Yes" } else { "No" });
    Ok(())
}

pub async fn cmd_requester(config: &Config, username: &str) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = service.get_requester(username).await;
    close_service(service).await;

    match result? {
        Some(requester) => println!(
            "{} was requested on {} by {}",
            username,
            requester.requested_on,
            requester.requested_by.as_deref().unwrap_or("unknown")
        ),
        None => println!("No account named {username}."),
    }
    Ok(())
}
