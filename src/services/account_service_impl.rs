//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use tokio::task;
use tracing::{info, warn};

use crate::accounts::{self, Lifetime};
use crate::config::{AccountsConfig, SecurityConfig};
use crate::db::{NewAccountRow, Store};
use crate::services::account_service::{
    AccountError, AccountService, AccountSummary, ListFilter, Requester,
};

pub struct SeaOrmAccountService {
    store: Store,
    accounts: AccountsConfig,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, accounts: AccountsConfig, security: SecurityConfig) -> Self {
        Self {
            store,
            accounts,
            security,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Hands the session back, e.g. to close it.
    #[must_use]
    pub fn into_store(self) -> Store {
        self.store
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str, AccountError> {
        if value.is_empty() {
            Err(AccountError::MissingArgument(name))
        } else {
            Ok(value)
        }
    }

    async fn require_existing(&self, username: &str) -> Result<(), AccountError> {
        Self::require(username, "username")?;

        if self.store.account_exists(username).await? {
            Ok(())
        } else {
            Err(AccountError::NotFound(username.to_string()))
        }
    }

    /// At most one row may match a user name; anything else means the table
    /// lost its primary key.
    fn single_match(count: u64, username: &str) -> Result<bool, AccountError> {
        match count {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(AccountError::Inconsistent(username.to_string())),
        }
    }

    /// An insert that trips the primary key lost a race with another writer.
    fn insert_error(username: &str, err: anyhow::Error) -> AccountError {
        if AccountError::is_unique_violation(&err) {
            AccountError::AlreadyExists(username.to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn username_exists(&self, username: &str) -> Result<bool, AccountError> {
        Self::require(username, "username")?;
        Ok(self.store.account_exists(username).await?)
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        lifetime: Option<Lifetime>,
        requested_by: Option<&str>,
    ) -> Result<AccountSummary, AccountError> {
        Self::require(username, "username")?;
        Self::require(password, "password")?;

        let today = Self::today();
        let lifetime = match lifetime {
            Some(l) if l.is_empty() => {
                return Err(AccountError::InvalidLifetime(format!("{l} is not a lifetime")));
            }
            Some(l) => l,
            None => Lifetime::Days(self.accounts.default_lifetime_days),
        };
        let expiration_date = lifetime.expiration_date(today)?;

        if self.store.account_exists(username).await? {
            return Err(AccountError::AlreadyExists(username.to_string()));
        }

        // Argon2 is CPU-bound; keep it off the async workers.
        let password = password.to_string();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || {
            accounts::hash_password(&password, &security)
        })
        .await
        .map_err(|e| AccountError::Internal(format!("Password hashing task panicked: {e}")))??;

        let row = NewAccountRow {
            user: username.to_string(),
            password_hash,
            uid: self.accounts.uid,
            gid: self.accounts.gid,
            dir: accounts::home_directory(&self.accounts.base_directory, username),
            requested_by: requested_by.filter(|r| !r.is_empty()).map(str::to_string),
            requested_on: today,
            expiration_date,
        };

        // Another writer may have taken the name since the existence check.
        let model = self
            .store
            .insert_account(row)
            .await
            .map_err(|e| Self::insert_error(username, e))?;

        info!(
            "Created FTP account {} ({}), expires {}",
            model.user, lifetime, model.expiration_date
        );

        Ok(AccountSummary::from(model))
    }

    async fn list_accounts(&self, filter: ListFilter) -> Result<Vec<AccountSummary>, AccountError> {
        let rows = self.store.list_accounts(filter.active_flag()).await?;
        Ok(rows.into_iter().map(AccountSummary::from).collect())
    }

    async fn get_account(&self, username: &str) -> Result<AccountSummary, AccountError> {
        Self::require(username, "username")?;

        self.store
            .get_account(username)
            .await?
            .map(AccountSummary::from)
            .ok_or_else(|| AccountError::NotFound(username.to_string()))
    }

    async fn deactivate_account(&self, username: &str) -> Result<bool, AccountError> {
        self.require_existing(username).await?;

        self.store.set_account_active(username, false).await?;
        info!("Deactivated FTP account {username}");

        self.is_account_deactivated(username).await
    }

    async fn activate_account(&self, username: &str) -> Result<bool, AccountError> {
        self.require_existing(username).await?;

        self.store.set_account_active(username, true).await?;
        info!("Activated FTP account {username}");

        self.is_account_deactivated(username).await
    }

    async fn is_account_deactivated(&self, username: &str) -> Result<bool, AccountError> {
        self.require_existing(username).await?;

        let count = self.store.count_deactivated_accounts(username).await?;
        Self::single_match(count, username)
    }

    async fn is_account_expired(&self, username: &str) -> Result<bool, AccountError> {
        self.require_existing(username).await?;

        let count = self
            .store
            .count_expired_accounts(username, Self::today())
            .await?;
        Self::single_match(count, username)
    }

    async fn renew_account(
        &self,
        username: &str,
        lifetime: Lifetime,
    ) -> Result<AccountSummary, AccountError> {
        Self::require(username, "username")?;
        if lifetime.is_empty() {
            return Err(AccountError::MissingArgument("lifetime"));
        }

        let today = Self::today();
        let expiration_date = lifetime.expiration_date(today)?;

        if !self.store.account_exists(username).await? {
            return Err(AccountError::NotFound(username.to_string()));
        }

        if self.is_account_deactivated(username).await? {
            if !self.accounts.reactivate_on_renew {
                warn!("Refusing to renew deactivated FTP account {username}");
                return Err(AccountError::Deactivated(username.to_string()));
            }
            info!("Renewal reactivates FTP account {username}");
        }

        let updated = self
            .store
            .renew_account(username, expiration_date, today)
            .await?;
        if updated == 0 {
            return Err(AccountError::NotFound(username.to_string()));
        }

        info!("Renewed FTP account {username} ({lifetime}), expires {expiration_date}");

        self.get_account(username).await
    }

    async fn get_requester(&self, username: &str) -> Result<Option<Requester>, AccountError> {
        Self::require(username, "username")?;

        let requester = self.store.get_account_requester(username).await?;
        Ok(requester.map(|(requested_by, requested_on)| Requester {
            requested_by,
            requested_on,
        }))
    }

    async fn list_expiring(&self, days: u32) -> Result<Vec<AccountSummary>, AccountError> {
        let today = Self::today();
        let until = today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| AccountError::InvalidLifetime(format!("{days} days is out of range")))?;

        let rows = self
            .store
            .list_accounts_expiring_between(today, until)
            .await?;
        Ok(rows.into_iter().map(AccountSummary::from).collect())
    }
}
