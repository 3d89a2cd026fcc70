//! List and show command handlers

use crate::config::Config;
use crate::services::{AccountService, ListFilter};

use super::{close_service, open_service, print_account_line};

pub async fn cmd_list_accounts(config: &Config, filter: ListFilter, json: bool) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = service.list_accounts(filter).await;
    close_service(service).await;
    let accounts = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No {} accounts.", filter.to_string().to_lowercase());
        return Ok(());
    }

    println!("{} accounts ({} total)", filter, accounts.len());
    println!("{:-<70}", "");

    for account in &accounts {
        print_account_line(account);
    }

    println!();
    println!("Legend: ✓ Active | ✗ Deactivated");

    Ok(())
}

pub async fn cmd_show_account(config: &Config, username: &str, json: bool) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let result = service.get_account(username).await;
    close_service(service).await;
    let account = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();

    println!("Account: {}", account.user);
    println!("{:-<70}", "");
    println!("Directory:     {}", account.dir);
    println!("Uid/Gid:       {}/{}", account.uid, account.gid);
    println!("Active:        {}", if account.active { "Yes" } else { "No" });
    println!(
        "Expires:       {}{}",
        account.expiration_date,
        if account.is_expired_on(today) { " (expired)" } else { "" }
    );
    println!(
        "Requested:     {} by {}",
        account.requested_on,
        account.requested_by.as_deref().unwrap_or("unknown")
    );
    match account.renewed_on {
        Some(renewed_on) => println!(
            "Renewed:       {} ({} times)",
            renewed_on, account.renew_counter
        ),
        None => println!("Renewed:       never"),
    }

    Ok(())
}

pub async fn cmd_list_expiring(config: &Config, days: Option<u32>, json: bool) -> anyhow::Result<()> {
    let days = days.unwrap_or(config.accounts.expiring_window_days);

    let service = open_service(config).await?;
    let result = service.list_expiring(days).await;
    close_service(service).await;
    let accounts = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No active accounts expire within {days} days.");
        return Ok(());
    }

    println!("Expiring within {} days ({} total)", days, accounts.len());
    println!("{:-<70}", "");

    for account in &accounts {
        print_account_line(account);
    }

    Ok(())
}
