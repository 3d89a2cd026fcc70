//! CLI module - Command-line interface for ftpaccounts
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::accounts::Lifetime;
use crate::services::ListFilter;

/// ftpaccounts - manage virtual FTP accounts in pure-ftpd's SQL user table
#[derive(Parser)]
#[command(name = "ftpaccounts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    Init,

    /// Create the users table if it does not exist
    InitDb,

    /// Check that the database is reachable
    Ping,

    /// Create a new account
    #[command(alias = "add")]
    Create {
        /// Login name; omit together with --generate to derive one
        username: Option<String>,

        /// Derive the login name from this seed, e.g. the requester's e-mail
        #[arg(long, conflicts_with = "username")]
        generate: Option<String>,

        /// Password; a random one is generated and printed when omitted
        #[arg(long)]
        password: Option<String>,

        /// Days from today, or an expiration date (YYYY-MM-DD)
        #[arg(long)]
        lifetime: Option<Lifetime>,

        /// Who asked for the account
        #[arg(long)]
        requested_by: Option<String>,
    },

    /// List accounts
    #[command(alias = "ls")]
    List {
        /// ACTIVE, EXPIRED (deactivated) or ALL
        #[arg(default_value = "ACTIVE")]
        filter: ListFilter,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one account
    Show {
        username: String,

        #[arg(long)]
        json: bool,
    },

    /// Extend an account's expiration date
    Renew {
        username: String,

        /// Days from today, or an expiration date (YYYY-MM-DD)
        lifetime: Lifetime,
    },

    /// Re-enable a deactivated account
    Activate { username: String },

    /// Disable an account without touching its expiration date
    #[command(alias = "disable")]
    Deactivate { username: String },

    /// Show whether an account is deactivated and/or expired
    Status { username: String },

    /// Show who requested an account and when
    Requester { username: String },

    /// List active accounts that expire soon
    Expiring {
        /// Window in days (defaults to accounts.expiring_window_days)
        days: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Generate credentials without touching the database
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
}

#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Random alphanumeric password
    Password {
        /// Length (defaults to accounts.password_length)
        length: Option<usize>,
    },
    /// Login name derived from a seed
    Username { seed: String },
}

pub use commands::*;
