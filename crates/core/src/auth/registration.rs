//! Registration payload checks.

use helptax_shared::FieldError;
use helptax_shared::auth::RegisterRequest;
use thiserror::Error;

use super::password::password_weakness;
use super::profile::{ProfileDraft, VatRegime, check_text, check_withholding};

/// Fields a registration must carry, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "email",
    "password1",
    "password2",
    "nombre_fiscal",
    "nif",
    "direccion",
    "codigo_postal",
    "ciudad",
    "provincia",
];

const MAX_EMAIL: usize = 254;

/// Why a registration payload is rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Required fields absent or empty.
    #[error("Campos requeridos faltantes")]
    MissingFields(Vec<&'static str>),

    /// `password1` and `password2` differ.
    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,

    /// Present but malformed fields.
    #[error("Datos de registro no válidos")]
    Invalid(Vec<FieldError>),
}

/// A validated registration.
#[derive(Clone)]
pub struct NewAccount {
    /// Login email, trimmed.
    pub email: String,
    /// Plaintext password, to be hashed before storage.
    pub password: String,
    /// Profile to create alongside the user.
    pub profile: ProfileDraft,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .field("nif", &self.profile.nif)
            .finish()
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Checks a registration request.
///
/// Missing fields are reported first, all at once; then the password pair;
/// then field formats. Uniqueness of email and NIF is left to storage.
///
/// # Errors
///
/// Returns the first failing stage as a `RegistrationError`.
pub fn validate_registration(req: &RegisterRequest) -> Result<NewAccount, RegistrationError> {
    let values = [
        &req.email,
        &req.password1,
        &req.password2,
        &req.nombre_fiscal,
        &req.nif,
        &req.direccion,
        &req.codigo_postal,
        &req.ciudad,
        &req.provincia,
    ];

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .zip(values)
        .filter(|(_, value)| present(Option::as_ref(value)).is_none())
        .map(|(field, _)| *field)
        .collect();

    let [
        Some(email),
        Some(password1),
        Some(password2),
        Some(nombre_fiscal),
        Some(nif),
        Some(direccion),
        Some(codigo_postal),
        Some(ciudad),
        Some(provincia),
    ] = values.map(|v| present(v.as_ref()))
    else {
        return Err(RegistrationError::MissingFields(missing));
    };

    if password1 != password2 {
        return Err(RegistrationError::PasswordMismatch);
    }

    let mut errors = Vec::new();

    let email = email.trim();
    if !email.contains('@') || email.chars().count() > MAX_EMAIL {
        errors.push(FieldError::new("email", "Introduzca una dirección de email válida."));
    }
    if let Some(reason) = password_weakness(password1) {
        errors.push(FieldError::new("password1", reason));
    }

    let profile = ProfileDraft {
        nombre_fiscal: check_text("nombre_fiscal", nombre_fiscal, &mut errors),
        nif: check_text("nif", nif, &mut errors),
        direccion: check_text("direccion", direccion, &mut errors),
        codigo_postal: check_text("codigo_postal", codigo_postal, &mut errors),
        ciudad: check_text("ciudad", ciudad, &mut errors),
        provincia: check_text("provincia", provincia, &mut errors),
        tipo_irpf_default: check_withholding(req.tipo_irpf_default.unwrap_or(7), &mut errors),
        regimen_iva: VatRegime::default(),
    };

    if !errors.is_empty() {
        return Err(RegistrationError::Invalid(errors));
    }

    Ok(NewAccount {
        email: email.to_string(),
        password: password1.to_string(),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: Some("laura@example.com".to_string()),
            password1: Some("autonomo-2025".to_string()),
            password2: Some("autonomo-2025".to_string()),
            nombre_fiscal: Some("Laura Pérez".to_string()),
            nif: Some("12345678Z".to_string()),
            direccion: Some("Calle Mayor 1".to_string()),
            codigo_postal: Some("28013".to_string()),
            ciudad: Some("Madrid".to_string()),
            provincia: Some("Madrid".to_string()),
            tipo_irpf_default: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        let account = validate_registration(&request()).unwrap();
        assert_eq!(account.email, "laura@example.com");
        assert_eq!(account.profile.tipo_irpf_default.percent(), 7);
        assert_eq!(account.profile.regimen_iva, VatRegime::General);
    }

    #[test]
    fn test_missing_fields_in_order() {
        let req = RegisterRequest {
            email: Some("laura@example.com".to_string()),
            password1: Some("autonomo-2025".to_string()),
            nif: Some("  ".to_string()),
            ..RegisterRequest::default()
        };

        assert_eq!(
            validate_registration(&req).unwrap_err(),
            RegistrationError::MissingFields(vec![
                "password2",
                "nombre_fiscal",
                "nif",
                "direccion",
                "codigo_postal",
                "ciudad",
                "provincia",
            ])
        );
    }

    #[test]
    fn test_password_mismatch() {
        let mut req = request();
        req.password2 = Some("otra-cosa-2025".to_string());
        assert_eq!(
            validate_registration(&req).unwrap_err(),
            RegistrationError::PasswordMismatch
        );
    }

    #[test]
    fn test_invalid_formats() {
        let mut req = request();
        req.email = Some("laura".to_string());
        req.codigo_postal = Some("280130".to_string());
        req.tipo_irpf_default = Some(25);

        let RegistrationError::Invalid(errors) = validate_registration(&req).unwrap_err() else {
            panic!("expected field errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "codigo_postal", "tipo_irpf_default"]);
    }

    #[test]
    fn test_debug_hides_password() {
        let account = validate_registration(&request()).unwrap();
        assert!(!format!("{account:?}").contains("autonomo-2025"));
    }
}
