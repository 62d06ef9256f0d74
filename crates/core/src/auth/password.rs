//! Password hashing with Argon2id.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Stored hash is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Verification failed for a reason other than a wrong password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),
}

/// Hashes a password into an Argon2id PHC string with a random salt.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use helptax_core::auth::hash_password;
///
/// let hash = hash_password("demo2025!").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a password against a stored PHC string.
///
/// A wrong password is `Ok(false)`, not an error.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` for a malformed hash and
/// `PasswordError::VerifyError` for any other failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Returns a reason when the password is too weak to register with.
#[must_use]
pub fn password_weakness(password: &str) -> Option<&'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Some("La contraseña debe tener al menos 8 caracteres")
    } else if password.chars().all(|c| c.is_ascii_digit()) {
        Some("La contraseña no puede ser solo numérica")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("autonomo-2025").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("autonomo-2025", &hash).unwrap());
        assert!(!verify_password("autonomo-2024", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("same").unwrap(),
            hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(matches!(
            verify_password("password", "pbkdf2_sha256$x"),
            Err(PasswordError::InvalidHash)
        ));
    }

    #[rstest]
    #[case("short", true)]
    #[case("12345678", true)]
    #[case("demo2025", false)]
    #[case("contraseña", false)]
    fn test_password_weakness(#[case] password: &str, #[case] weak: bool) {
        assert_eq!(password_weakness(password).is_some(), weak);
    }
}
