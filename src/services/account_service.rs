//! Domain service for FTP account administration.
//!
//! Validation, error taxonomy and renewal policy live here; SQL lives in
//! [`crate::db::repositories::account`].

use chrono::NaiveDate;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::accounts::Lifetime;
use crate::entities::users;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied for database user '{0}', check user name and password")]
    AuthenticationFailed(String),

    #[error("Database does not exist: {0}")]
    DatabaseMissing(String),

    #[error("Can't connect to database server: {0}")]
    Unreachable(String),

    #[error("{0} is missing")]
    MissingArgument(&'static str),

    #[error("Supplied date is malformed: {0}")]
    MalformedDate(String),

    #[error("Invalid lifetime: {0}")]
    InvalidLifetime(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("User {0} already exists")]
    AlreadyExists(String),

    #[error("Account {0} is deactivated and may not be renewed")]
    Deactivated(String),

    #[error("Search returned more than one result for {0}")]
    Inconsistent(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for AccountError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        if err.downcast_ref::<DbErr>().is_some() {
            Self::Database(format!("{err:#}"))
        } else {
            Self::Internal(format!("{err:#}"))
        }
    }
}

impl AccountError {
    /// True when the error came from the primary-key constraint on `User`.
    #[must_use]
    pub fn is_unique_violation(err: &anyhow::Error) -> bool {
        err.downcast_ref::<DbErr>()
            .and_then(DbErr::sql_err)
            .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
    }
}

/// Which accounts `list_accounts` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    Active,
    /// Accounts whose `Active` flag is cleared.
    Expired,
    All,
}

impl ListFilter {
    /// Value the `Active` column must have, or `None` for no filtering.
    #[must_use]
    pub const fn active_flag(self) -> Option<bool> {
        match self {
            Self::Active => Some(true),
            Self::Expired => Some(false),
            Self::All => None,
        }
    }
}

impl FromStr for ListFilter {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "EXPIRED" => Ok(Self::Expired),
            "ALL" => Ok(Self::All),
            _ => Err(AccountError::Config(format!(
                "Unknown filter '{s}', expected ACTIVE, EXPIRED or ALL"
            ))),
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::All => "ALL",
        })
    }
}

/// Account row without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub user: String,
    pub dir: String,
    pub uid: i32,
    pub gid: i32,
    pub active: bool,
    pub expiration_date: NaiveDate,
    pub requested_by: Option<String>,
    pub requested_on: NaiveDate,
    pub renewed_on: Option<NaiveDate>,
    pub renew_counter: i32,
}

impl From<users::Model> for AccountSummary {
    fn from(model: users::Model) -> Self {
        Self {
            user: model.user,
            dir: model.dir,
            uid: model.uid,
            gid: model.gid,
            active: model.active,
            expiration_date: model.expiration_date,
            requested_by: model.requested_by,
            requested_on: model.requested_on,
            renewed_on: model.renewed_on,
            renew_counter: model.renew_counter,
        }
    }
}

impl AccountSummary {
    /// Expired means today is past the expiration date; the flag is not consulted.
    #[must_use]
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expiration_date
    }
}

/// Who asked for an account and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requester {
    pub requested_by: Option<String>,
    pub requested_on: NaiveDate,
}

/// Domain service trait for account administration.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Point lookup on the user name.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::MissingArgument`] for an empty name.
    async fn username_exists(&self, username: &str) -> Result<bool, AccountError>;

    /// Creates an active account with a hashed password.
    ///
    /// `lifetime` of `None` uses the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::AlreadyExists`] if the name is taken and
    /// [`AccountError::InvalidLifetime`] for a zero day count.
    async fn create_account(
        &self,
        username: &str,
        password: &str,
        lifetime: Option<Lifetime>,
        requested_by: Option<&str>,
    ) -> Result<AccountSummary, AccountError>;

    /// Lists accounts ordered by name. An empty vector means nothing matched.
    async fn list_accounts(&self, filter: ListFilter) -> Result<Vec<AccountSummary>, AccountError>;

    async fn get_account(&self, username: &str) -> Result<AccountSummary, AccountError>;

    /// Clears the `Active` flag and returns the resulting deactivated state.
    async fn deactivate_account(&self, username: &str) -> Result<bool, AccountError>;

    /// Sets the `Active` flag and returns the resulting deactivated state.
    async fn activate_account(&self, username: &str) -> Result<bool, AccountError>;

    async fn is_account_deactivated(&self, username: &str) -> Result<bool, AccountError>;

    async fn is_account_expired(&self, username: &str) -> Result<bool, AccountError>;

    /// Moves the expiration date, bumps the renewal counter and stamps the
    /// renewal date.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Deactivated`] when the account is deactivated
    /// and reactivation on renewal is disabled.
    async fn renew_account(
        &self,
        username: &str,
        lifetime: Lifetime,
    ) -> Result<AccountSummary, AccountError>;

    async fn get_requester(&self, username: &str) -> Result<Option<Requester>, AccountError>;

    /// Active accounts expiring between today and `days` from now.
    async fn list_expiring(&self, days: u32) -> Result<Vec<AccountSummary>, AccountError>;
}
