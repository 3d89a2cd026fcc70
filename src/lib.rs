pub mod accounts;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod services;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GenerateCommands};
pub use config::Config;
pub use db::Store;
pub use services::{AccountError, AccountService, SeaOrmAccountService};

pub async fn run() -> anyhow::Result<()> {
    let args = Cli::parse();

    // The config file may not exist yet.
    if matches!(args.command, Commands::Init) {
        init_tracing(&Config::default());
        let path = args.config.unwrap_or_else(Config::default_config_path);
        return cli::cmd_init(&path).await;
    }

    let source = args.config.clone().or_else(Config::locate);
    let config = match &source {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    init_tracing(&config);

    match &source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    match args.command {
        Commands::Init => Ok(()),

        Commands::InitDb => cli::cmd_init_db(&config).await,

        Commands::Ping => cli::cmd_ping(&config).await,

        Commands::Create {
            username,
            generate,
            password,
            lifetime,
            requested_by,
        } => {
            cli::cmd_create_account(
                &config,
                username.as_deref(),
                generate.as_deref(),
                password.as_deref(),
                lifetime,
                requested_by.as_deref(),
            )
            .await
        }

        Commands::List { filter, json } => cli::cmd_list_accounts(&config, filter, json).await,

        Commands::Show { username, json } => cli::cmd_show_account(&config, &username, json).await,

        Commands::Renew { username, lifetime } => {
            cli::cmd_renew_account(&config, &username, lifetime).await
        }

        Commands::Activate { username } => cli::cmd_activate_account(&config, &username).await,

        Commands::Deactivate { username } => cli::cmd_deactivate_account(&config, &username).await,

        Commands::Status { username } => cli::cmd_account_status(&config, &username).await,

        Commands::Requester { username } => cli::cmd_requester(&config, &username).await,

        Commands::Expiring { days, json } => cli::cmd_list_expiring(&config, days, json).await,

        Commands::Generate { command } => match command {
            GenerateCommands::Password { length } => {
                cli::cmd_generate_password(&config, length).await
            }
            GenerateCommands::Username { seed } => cli::cmd_generate_username(&seed).await,
        },
    }
}

/// Logs go to stderr so command output on stdout stays scriptable.
fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
