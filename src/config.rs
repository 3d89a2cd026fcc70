use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub accounts: AccountsConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Mysql,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,

    pub host: String,

    pub port: u16,

    pub user: String,

    /// Can be left empty and supplied through `FTPACCOUNTS_DB_PASSWORD`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,

    pub name: String,

    /// Path to the database file, or `:memory:`. Only used by the sqlite backend.
    pub sqlite_path: String,

    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Mysql,
            host: "localhost".to_string(),
            port: constants::database::DEFAULT_MYSQL_PORT,
            user: "pureftpd".to_string(),
            password: String::new(),
            name: "pureftpd".to_string(),
            sqlite_path: "data/ftpaccounts.db".to_string(),
            max_connections: 1,
        }
    }
}

impl DatabaseConfig {
    /// In-memory sqlite database, mostly useful for tests.
    #[must_use]
    pub fn sqlite_memory() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            sqlite_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            sqlite_path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.backend == DatabaseBackend::Sqlite && self.sqlite_path == ":memory:"
    }

    /// Names of the connection parameters that are required but empty.
    #[must_use]
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        match self.backend {
            DatabaseBackend::Mysql => {
                if self.host.is_empty() {
                    missing.push("host");
                }
                if self.user.is_empty() {
                    missing.push("user");
                }
                if self.password.is_empty() {
                    missing.push("password");
                }
                if self.name.is_empty() {
                    missing.push("name");
                }
            }
            DatabaseBackend::Sqlite => {
                if self.sqlite_path.is_empty() {
                    missing.push("sqlite_path");
                }
            }
        }

        missing
    }

    /// Connection URL understood by sea-orm.
    #[must_use]
    pub fn url(&self) -> String {
        match self.backend {
            DatabaseBackend::Mysql => format!(
                "mysql://{}:{}@{}:{}/{}",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host,
                self.port,
                self.name
            ),
            DatabaseBackend::Sqlite if self.is_memory() => "sqlite::memory:".to_string(),
            DatabaseBackend::Sqlite => format!("sqlite:{}?mode=rw", self.sqlite_path),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Lifetime used when an account is created without one
    pub default_lifetime_days: u32,

    /// Home directories are `<base_directory>/<user>`
    pub base_directory: String,

    pub uid: i32,

    pub gid: i32,

    pub password_length: usize,

    /// Whether renewing a deactivated account silently activates it again.
    /// When false, renewal of a deactivated account is refused.
    pub reactivate_on_renew: bool,

    pub expiring_window_days: u32,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_lifetime_days: constants::accounts::DEFAULT_LIFETIME_DAYS,
            base_directory: constants::accounts::DEFAULT_BASE_DIRECTORY.to_string(),
            uid: constants::accounts::DEFAULT_UID,
            gid: constants::accounts::DEFAULT_GID,
            password_length: constants::credentials::DEFAULT_PASSWORD_LENGTH,
            reactivate_on_renew: true,
            expiring_window_days: constants::accounts::DEFAULT_EXPIRING_WINDOW_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    /// Loads the first config file on the search path, or the defaults.
    pub fn load() -> Result<Self> {
        match Self::locate() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default().with_env_overrides()),
        }
    }

    /// First existing file on the search path. Runs before tracing is set
    /// up, so callers log the outcome themselves.
    #[must_use]
    pub fn locate() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|path| path.exists())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        match std::env::var(constants::database::PASSWORD_ENV_VAR) {
            Ok(password) if !password.is_empty() => self.database.password = password,
            _ => {}
        }
        self
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(Self::default_config_path());

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ftpaccounts").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ftpaccounts").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("ftpaccounts.toml")
    }

    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.database.missing_parameters();
        if !missing.is_empty() {
            anyhow::bail!("Database parameters are missing: {}", missing.join(", "));
        }

        if self.accounts.base_directory.is_empty() {
            anyhow::bail!("accounts.base_directory cannot be empty");
        }

        if self.accounts.password_length == 0 {
            anyhow::bail!("accounts.password_length must be > 0");
        }

        Ok(())
    }
}
