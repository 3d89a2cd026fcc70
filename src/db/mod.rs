use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::sqlx;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, RuntimeErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::constants;
use crate::entities::users;
use crate::services::AccountError;

pub mod migrator;
pub mod repositories;

pub use repositories::account::{AccountRepository, NewAccountRow};

/// MySQL server error numbers that identify a connect failure.
const ER_DBACCESS_DENIED: u16 = 1044;
const ER_ACCESS_DENIED: u16 = 1045;
const ER_BAD_DB: u16 = 1049;

/// An open database session. Dropping or [`Store::close`]-ing it releases
/// the connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Connects to an existing database.
    ///
    /// # Errors
    ///
    /// [`AccountError::Config`] when parameters are missing (checked before any
    /// connection attempt), [`AccountError::AuthenticationFailed`],
    /// [`AccountError::DatabaseMissing`] or [`AccountError::Unreachable`] when
    /// the server refuses us.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AccountError> {
        let missing = config.missing_parameters();
        if !missing.is_empty() {
            return Err(AccountError::Config(format!(
                "Database parameters are missing: {}",
                missing.join(", ")
            )));
        }

        if config.backend == DatabaseBackend::Sqlite
            && !config.is_memory()
            && !Path::new(&config.sqlite_path).exists()
        {
            return Err(AccountError::DatabaseMissing(config.sqlite_path.clone()));
        }

        let mut opt = ConnectOptions::new(config.url());
        opt.max_connections(config.max_connections.max(1))
            .min_connections(1)
            .connect_timeout(constants::database::CONNECT_TIMEOUT)
            .acquire_timeout(constants::database::CONNECT_TIMEOUT)
            .sqlx_logging(false);

        // An in-memory sqlite database lives exactly as long as its one connection.
        if config.is_memory() {
            opt.max_connections(1);
        } else {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt)
            .await
            .map_err(|e| classify_connect_error(e, config))?;

        info!("Database connected ({})", describe_target(config));

        Ok(Self { conn })
    }

    /// Like [`Store::connect`], but creates a missing sqlite file first.
    pub async fn create(config: &DatabaseConfig) -> Result<Self, AccountError> {
        if config.backend == DatabaseBackend::Sqlite && !config.is_memory() {
            let path = Path::new(&config.sqlite_path);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AccountError::Internal(format!(
                        "Failed to create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
            if !path.exists() {
                std::fs::File::create(path).map_err(|e| {
                    AccountError::Internal(format!("Failed to create {}: {e}", path.display()))
                })?;
                info!("Created database file {}", path.display());
            }
        }

        Self::connect(config).await
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn init_tables(&self) -> Result<()> {
        use sea_orm_migration::MigratorTrait;

        migrator::Migrator::up(&self.conn, None).await?;
        info!("Account table ready");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Releases the connection. Errors while closing are logged and dropped.
    pub async fn close(self) {
        match self.conn.close().await {
            Ok(()) => debug!("Database connection closed"),
            Err(e) => warn!("Ignoring error while closing database connection: {e}"),
        }
    }

    // ========== Account Repository Methods ==========

    #[must_use]
    pub fn account_repo(&self) -> AccountRepository {
        AccountRepository::new(self.conn.clone())
    }

    pub async fn account_exists(&self, username: &str) -> Result<bool> {
        self.account_repo().exists(username).await
    }

    pub async fn get_account(&self, username: &str) -> Result<Option<users::Model>> {
        self.account_repo().get(username).await
    }

    pub async fn insert_account(&self, row: NewAccountRow) -> Result<users::Model> {
        self.account_repo().insert(row).await
    }

    pub async fn list_accounts(&self, active: Option<bool>) -> Result<Vec<users::Model>> {
        self.account_repo().list(active).await
    }

    pub async fn list_accounts_expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<users::Model>> {
        self.account_repo().list_expiring_between(from, to).await
    }

    pub async fn set_account_active(&self, username: &str, active: bool) -> Result<u64> {
        self.account_repo().set_active(username, active).await
    }

    pub async fn count_deactivated_accounts(&self, username: &str) -> Result<u64> {
        self.account_repo().count_deactivated(username).await
    }

    pub async fn count_expired_accounts(&self, username: &str, today: NaiveDate) -> Result<u64> {
        self.account_repo().count_expired(username, today).await
    }

    pub async fn renew_account(
        &self,
        username: &str,
        expiration_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<u64> {
        self.account_repo()
            .renew(username, expiration_date, today)
            .await
    }

    pub async fn get_account_requester(
        &self,
        username: &str,
    ) -> Result<Option<(Option<String>, NaiveDate)>> {
        self.account_repo().requester(username).await
    }
}

fn describe_target(config: &DatabaseConfig) -> String {
    match config.backend {
        DatabaseBackend::Mysql => format!(
            "mysql://{}@{}:{}/{}",
            config.user, config.host, config.port, config.name
        ),
        DatabaseBackend::Sqlite => format!("sqlite:{}", config.sqlite_path),
    }
}

/// Splits connect failures into bad credentials, missing database and
/// everything else.
fn classify_connect_error(err: DbErr, config: &DatabaseConfig) -> AccountError {
    if let DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) = &err {
        if let Some(mysql_err) = db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
            if let Some(classified) = classify_mysql_error(mysql_err.number(), config) {
                return classified;
            }
        }
    }

    AccountError::Unreachable(format!("{}: {err}", describe_target(config)))
}

/// Maps the MySQL server error numbers that have a dedicated error kind.
fn classify_mysql_error(number: u16, config: &DatabaseConfig) -> Option<AccountError> {
    match number {
        ER_ACCESS_DENIED | ER_DBACCESS_DENIED => {
            Some(AccountError::AuthenticationFailed(config.user.clone()))
        }
        ER_BAD_DB => Some(AccountError::DatabaseMissing(config.name.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_failures_are_unreachable() {
        let config = DatabaseConfig {
            password: "secret".to_string(),
            ..DatabaseConfig::default()
        };
        let err = classify_connect_error(DbErr::Conn(RuntimeErr::Internal("refused".into())), &config);

        match err {
            AccountError::Unreachable(msg) => {
                assert!(msg.contains("localhost:3306"));
                assert!(!msg.contains("secret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mysql_access_denied_is_authentication_failure() {
        let config = DatabaseConfig::default();

        for number in [ER_ACCESS_DENIED, ER_DBACCESS_DENIED] {
            match classify_mysql_error(number, &config) {
                Some(AccountError::AuthenticationFailed(user)) => assert_eq!(user, "pureftpd"),
                other => panic!("unexpected classification for {number}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_mysql_bad_database_is_missing_database() {
        let config = DatabaseConfig {
            name: "ftpusers".to_string(),
            ..DatabaseConfig::default()
        };

        assert!(matches!(
            classify_mysql_error(ER_BAD_DB, &config),
            Some(AccountError::DatabaseMissing(name)) if name == "ftpusers"
        ));
    }

    #[test]
    fn test_other_mysql_errors_fall_through() {
        let config = DatabaseConfig::default();

        // ER_CON_COUNT_ERROR: too many connections
        assert!(classify_mysql_error(1040, &config).is_none());
        assert!(classify_mysql_error(0, &config).is_none());
    }
}
