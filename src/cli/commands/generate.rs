use crate::accounts;
use crate::config::Config;

pub async fn cmd_generate_password(config: &Config, length: Option<usize>) -> anyhow::Result<()> {
    let length = length.unwrap_or(config.accounts.password_length);
    if length == 0 {
        anyhow::bail!("Password length must be > 0");
    }

    println!("{}", accounts::generate_password(length));
    Ok(())
}

pub async fn cmd_generate_username(seed: &str) -> anyhow::Result<()> {
    println!("{}", accounts::generate_username(seed)?);
    Ok(())
}
