//! Create account command handler

use crate::accounts::{self, Lifetime};
use crate::config::Config;
use crate::services::AccountService;

use super::{close_service, open_service};

pub async fn cmd_create_account(
    config: &Config,
    username: Option<&str>,
    generate_seed: Option<&str>,
    password: Option<&str>,
    lifetime: Option<Lifetime>,
    requested_by: Option<&str>,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;

    let username = match (username, generate_seed) {
        (Some(name), _) => name.to_string(),
        (None, Some(seed)) => {
            let name = accounts::generate_username(seed)?;
            if service.username_exists(&name).await? {
                close_service(service).await;
                anyhow::bail!("Generated name {name} is already taken, try again");
            }
            name
        }
        (None, None) => {
            close_service(service).await;
            anyhow::bail!("Give a username or --generate <seed>");
        }
    };

    // Only the hash is stored, so a generated password is shown exactly once.
    let generated_password = password
        .is_none()
        .then(|| accounts::generate_password(config.accounts.password_length));
    let password = password
        .or(generated_password.as_deref())
        .unwrap_or_default();

    let result = service
        .create_account(&username, password, lifetime, requested_by)
        .await;
    close_service(service).await;
    let account = result?;

    println!("✓ Created account {}", account.user);
    println!("  Directory: {}", account.dir);
    println!("  Expires:   {}", account.expiration_date);
    if let Some(requested_by) = &account.requested_by {
        println!("  Requested by: {requested_by}");
    }
    if let Some(generated) = generated_password {
        println!("  Password:  {generated}");
        println!();
        println!("Store this password now, it cannot be shown again.");
    }

    Ok(())
}
