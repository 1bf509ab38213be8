// src/common/validation.rs

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

use crate::common::error::AppError;

/// Validador para `#[validate(custom(function = "not_blank"))]`:
/// rejeita strings vazias ou só com espaços.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("Campo obrigatório."));
        return Err(err);
    }
    Ok(())
}

// Helper para criar erro de validação de um único campo
pub fn validation_error(field: &'static str, message: &str) -> AppError {
    let mut errors = ValidationErrors::new();
    let mut err = ValidationError::new("required");
    err.message = Some(Cow::from(message.to_string()));
    errors.add(field, err);
    AppError::ValidationError(errors)
}

/// Exige texto não vazio em argumentos que não vêm de um payload validado
/// (justificativa de edição, motivo de falta).
pub fn require_text(field: &'static str, value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(validation_error(field, message)),
    }
}

// Campo opcional de formulário: "" vira None.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected_with_field_name() {
        let err = require_text("motivoAlteracao", Some("   "), "Justificativa obrigatória.").unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("motivoAlteracao"));
            }
            other => panic!("esperava ValidationError, veio {other:?}"),
        }
        assert!(require_text("x", None, "msg").is_err());
    }

    #[test]
    fn text_is_trimmed_when_accepted() {
        assert_eq!(require_text("x", Some("  no-show "), "msg").unwrap(), "no-show");
    }

    #[test]
    fn empty_optional_fields_become_none() {
        assert_eq!(normalize_optional(Some("  ".into())), None);
        assert_eq!(normalize_optional(Some(" I10 ".into())), Some("I10".to_string()));
        assert_eq!(normalize_optional(None), None);
    }
}
