mod create;
mod generate;
mod lifecycle;
mod list;
mod setup;
mod status;

pub use create::cmd_create_account;
pub use generate::{cmd_generate_password, cmd_generate_username};
pub use lifecycle::{cmd_activate_account, cmd_deactivate_account, cmd_renew_account};
pub use list::{cmd_list_accounts, cmd_list_expiring, cmd_show_account};
pub use setup::{cmd_init, cmd_init_db, cmd_ping};
pub use status::{cmd_account_status, cmd_requester};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountSummary, SeaOrmAccountService};

pub(crate) async fn open_service(config: &Config) -> anyhow::Result<SeaOrmAccountService> {
    config.validate()?;
    let store = Store::connect(&config.database).await?;

    Ok(SeaOrmAccountService::new(
        store,
        config.accounts.clone(),
        config.security.clone(),
    ))
}

pub(crate) async fn close_service(service: SeaOrmAccountService) {
    service.into_store().close().await;
}

pub(crate) fn print_account_line(account: &AccountSummary) {
    let state = if account.active { "✓" } else { "✗" };
    let requested_by = account.requested_by.as_deref().unwrap_or("-");

    println!(
        "{} {:<24} expires {} | renewed {}x | requested by {}",
        state, account.user, account.expiration_date, account.renew_counter, requested_by
    );
}
