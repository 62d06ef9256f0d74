//! Self-employed profile (`PerfilAutonomo`) fields.

use helptax_shared::FieldError;
use serde::{Deserialize, Serialize};

use crate::tax::WithholdingRate;

/// VAT regime the taxpayer is registered under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VatRegime {
    /// Régimen general.
    #[default]
    General,
    /// Régimen simplificado.
    Simplificado,
    /// Recargo de equivalencia.
    Recargo,
}

impl VatRegime {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Simplificado => "simplificado",
            Self::Recargo => "recargo",
        }
    }
}

impl std::str::FromStr for VatRegime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "simplificado" => Ok(Self::Simplificado),
            "recargo" => Ok(Self::Recargo),
            other => Err(format!("\"{other}\" no es un régimen de IVA válido")),
        }
    }
}

impl std::fmt::Display for VatRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    /// Fiscal name.
    pub nombre_fiscal: String,
    /// Tax ID.
    pub nif: String,
    /// Street address.
    pub direccion: String,
    /// Postal code.
    pub codigo_postal: String,
    /// City.
    pub ciudad: String,
    /// Province.
    pub provincia: String,
    /// Withholding applied to invoices by default.
    pub tipo_irpf_default: WithholdingRate,
    /// VAT regime.
    pub regimen_iva: VatRegime,
}

/// Editable profile fields as sent by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    /// Fiscal name.
    pub nombre_fiscal: Option<String>,
    /// Tax ID.
    pub nif: Option<String>,
    /// Street address.
    pub direccion: Option<String>,
    /// Postal code.
    pub codigo_postal: Option<String>,
    /// City.
    pub ciudad: Option<String>,
    /// Province.
    pub provincia: Option<String>,
    /// Default withholding percentage.
    pub tipo_irpf_default: Option<i32>,
    /// VAT regime.
    pub regimen_iva: Option<String>,
}

// (field, max chars); `None` means unbounded.
pub(super) const LIMITS: [(&str, Option<usize>); 6] = [
    ("nombre_fiscal", Some(200)),
    ("nif", Some(9)),
    ("direccion", None),
    ("codigo_postal", Some(5)),
    ("ciudad", Some(100)),
    ("provincia", Some(100)),
];

pub(super) fn check_text(field: &str, value: &str, errors: &mut Vec<FieldError>) -> String {
    let trimmed = value.trim();
    let limit = LIMITS
        .iter()
        .find(|(name, _)| *name == field)
        .and_then(|(_, max)| *max);

    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "This field may not be blank."));
    } else if let Some(max) = limit.filter(|max| trimmed.chars().count() > *max) {
        errors.push(FieldError::new(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }

    trimmed.to_string()
}

pub(super) fn check_withholding(value: i32, errors: &mut Vec<FieldError>) -> WithholdingRate {
    WithholdingRate::try_from(value).unwrap_or_else(|e| {
        errors.push(FieldError::new("tipo_irpf_default", e.to_string()));
        WithholdingRate::default()
    })
}

impl ProfileInput {
    /// Applies the supplied fields to `current` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns one `FieldError` per invalid supplied field.
    pub fn apply_to(&self, current: &ProfileDraft) -> Result<ProfileDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let mut text = |field: &str, value: Option<&String>, stored: &str| match value {
            Some(v) => check_text(field, v, &mut errors),
            None => stored.to_string(),
        };

        let nombre_fiscal = text("nombre_fiscal", self.nombre_fiscal.as_ref(), &current.nombre_fiscal);
        let nif = text("nif", self.nif.as_ref(), &current.nif);
        let direccion = text("direccion", self.direccion.as_ref(), &current.direccion);
        let codigo_postal = text("codigo_postal", self.codigo_postal.as_ref(), &current.codigo_postal);
        let ciudad = text("ciudad", self.ciudad.as_ref(), &current.ciudad);
        let provincia = text("provincia", self.provincia.as_ref(), &current.provincia);

        let tipo_irpf_default = match self.tipo_irpf_default {
            Some(value) => check_withholding(value, &mut errors),
            None => current.tipo_irpf_default,
        };

        let regimen_iva = match self.regimen_iva.as_deref().map(str::parse::<VatRegime>) {
            Some(Ok(regime)) => regime,
            Some(Err(message)) => {
                errors.push(FieldError::new("regimen_iva", message));
                current.regimen_iva
            }
            None => current.regimen_iva,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProfileDraft {
            nombre_fiscal,
            nif,
            direccion,
            codigo_postal,
            ciudad,
            provincia,
            tipo_irpf_default,
            regimen_iva,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> ProfileDraft {
        ProfileDraft {
            nombre_fiscal: "Laura Pérez".to_string(),
            nif: "12345678Z".to_string(),
            direccion: "Calle Mayor 1".to_string(),
            codigo_postal: "28013".to_string(),
            ciudad: "Madrid".to_string(),
            provincia: "Madrid".to_string(),
            tipo_irpf_default: WithholdingRate::default(),
            regimen_iva: VatRegime::General,
        }
    }

    #[test]
    fn test_partial_update() {
        let input = ProfileInput {
            ciudad: Some(" Getafe ".to_string()),
            tipo_irpf_default: Some(15),
            regimen_iva: Some("simplificado".to_string()),
            ..ProfileInput::default()
        };

        let updated = input.apply_to(&current()).unwrap();
        assert_eq!(updated.ciudad, "Getafe");
        assert_eq!(updated.tipo_irpf_default.percent(), 15);
        assert_eq!(updated.regimen_iva, VatRegime::Simplificado);
        assert_eq!(updated.nif, "12345678Z");
    }

    #[test]
    fn test_invalid_fields_reported() {
        let input = ProfileInput {
            nif: Some("1234567890".to_string()),
            codigo_postal: Some(String::new()),
            tipo_irpf_default: Some(30),
            regimen_iva: Some("especial".to_string()),
            ..ProfileInput::default()
        };

        let errors = input.apply_to(&current()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["nif", "codigo_postal", "tipo_irpf_default", "regimen_iva"]
        );
    }

    #[test]
    fn test_vat_regime_round_trip() {
        for regime in [VatRegime::General, VatRegime::Simplificado, VatRegime::Recargo] {
            assert_eq!(regime.as_str().parse::<VatRegime>(), Ok(regime));
        }
        assert!("otro".parse::<VatRegime>().is_err());
    }
}
