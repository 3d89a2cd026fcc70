use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha1::{Digest, Sha1};
use std::fmt::Write;

use crate::config::SecurityConfig;
use crate::constants::{USERNAME_PREFIX, credentials::USERNAME_HASH_CHARS};
use crate::services::AccountError;

/// Random password of `length` characters from `[A-Za-z0-9]`.
#[must_use]
pub fn generate_password(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Derives a login name like `ftp-3f0c9a1b2d` from a seed, a random value and
/// the current time. Collisions are possible; callers must check the name is
/// still free before using it.
pub fn generate_username(seed: &str) -> Result<String, AccountError> {
    if seed.is_empty() {
        return Err(AccountError::MissingArgument("seed"));
    }

    let noise: f64 = rand::rng().random();
    let timestamp = chrono::Utc::now().timestamp();

    let mut hasher = Sha1::new();
    hasher.update(seed.as_bytes());
    hasher.update(noise.to_string().as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut username = String::with_capacity(USERNAME_PREFIX.len() + USERNAME_HASH_CHARS);
    username.push_str(USERNAME_PREFIX);
    for b in digest.iter().take(USERNAME_HASH_CHARS / 2) {
        let _ = write!(username, "{b:02x}");
    }

    Ok(username)
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC hash string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
