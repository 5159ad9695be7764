//! Field-level validation errors shared by every form the API accepts.
//!
//! Forms derive [`validator::Validate`] for their field rules, password
//! confirmation included. Rules that need storage (uniqueness, the current
//! password) are appended afterwards, so every failure ends up keyed by the
//! field the client should highlight.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for `field`, the one a form shows under the input.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Runs the derived rules of `form` and collects whatever fails.
    pub fn collect<T: validator::Validate>(form: &T) -> Self {
        match form.validate() {
            Ok(()) => Self::new(),
            Err(errors) => Self::from(errors),
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("O campo {} é inválido", field));
                fields.add(field, &message);
            }
        }
        fields
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.values().flatten().next() {
            Some(message) => f.write_str(message),
            None => f.write_str("The given data was invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_keeps_derived_messages() {
        #[derive(validator::Validate)]
        struct Form {
            #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
            password: String,
            #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
            password_confirmation: String,
        }

        let errors = FieldErrors::collect(&Form {
            password: "secret123".to_string(),
            password_confirmation: "secret124".to_string(),
        });
        assert_eq!(errors.first("password_confirmation"), Some("As senhas não coincidem"));
        assert!(errors.get("password").is_none());

        let errors = FieldErrors::collect(&Form {
            password: "abc".to_string(),
            password_confirmation: "abc".to_string(),
        });
        assert_eq!(errors.first("password"), Some("A senha deve ter pelo menos 6 caracteres"));
        assert!(errors.get("password_confirmation").is_none());
    }

    #[test]
    fn test_into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("name", "x").into_result().is_err());
    }

    #[test]
    fn test_display_uses_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("email", "E-mail inválido");
        errors.add("email", "outro");
        assert_eq!(errors.to_string(), "E-mail inválido");
    }

    #[test]
    fn test_serializes_as_field_map() {
        let errors = FieldErrors::single("phone", "Telefone inválido");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "phone": ["Telefone inválido"] }));
    }
}
