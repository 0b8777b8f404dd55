//! Password rules and argon2 hashing of stored credentials.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Applied to every password a user picks, at signup and on change.
pub fn validate_new_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| hashing_failed("hash new password", e))
}

/// `Ok(false)` on a mismatch. A stored hash that cannot be parsed is a
/// server-side fault, not a wrong password.
pub fn verify_password(plain: &str, stored: &str) -> AppResult<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| hashing_failed("parse stored password hash", e))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hashing_failed("verify password", e)),
    }
}

fn hashing_failed(step: &str, err: password_hash::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("{}: {}", step, err))
}
