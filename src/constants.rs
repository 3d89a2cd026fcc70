pub const USERNAME_PREFIX: &str = "ftp-";

pub mod accounts {

    pub const DEFAULT_LIFETIME_DAYS: u32 = 7;

    pub const DEFAULT_BASE_DIRECTORY: &str = "/srv/ftp";

    pub const DEFAULT_UID: i32 = 1001;

    pub const DEFAULT_GID: i32 = 1001;

    pub const DEFAULT_EXPIRING_WINDOW_DAYS: u32 = 3;
}

pub mod credentials {

    pub const DEFAULT_PASSWORD_LENGTH: usize = 13;

    /// Hex characters of the SHA-1 digest kept in generated usernames.
    pub const USERNAME_HASH_CHARS: usize = 10;
}

pub mod database {
    use std::time::Duration;

    pub const DEFAULT_MYSQL_PORT: u16 = 3306;

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub const PASSWORD_ENV_VAR: &str = "FTPACCOUNTS_DB_PASSWORD";
}
