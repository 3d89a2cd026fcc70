//! Account helpers that do not touch the database: lifetime parsing and
//! credential generation.

pub mod credentials;
pub mod lifetime;

pub use credentials::{generate_password, generate_username, hash_password, verify_password};
pub use lifetime::{Lifetime, check_date_format};

/// Home directory for an account, always `/`-joined regardless of host OS.
#[must_use]
pub fn home_directory(base_directory: &str, username: &str) -> String {
    format!("{}/{}", base_directory.trim_end_matches('/'), username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_directory() {
        assert_eq!(home_directory("/srv/ftp", "alice"), "/srv/ftp/alice");
        assert_eq!(home_directory("/srv/ftp/", "alice"), "/srv/ftp/alice");
    }
}
