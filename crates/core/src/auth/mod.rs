//! Accounts: password hashing, registration and profile checks.

mod password;
mod profile;
mod registration;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, hash_password, password_weakness, verify_password,
};
pub use profile::{ProfileDraft, ProfileInput, VatRegime};
pub use registration::{NewAccount, REQUIRED_FIELDS, RegistrationError, validate_registration};
