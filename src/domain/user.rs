use crate::domain::phone::{format_br_phone, validate_phone};
use crate::domain::validation::FieldErrors;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const PASSWORD_RESET_TTL_MINUTES: i64 = 60;
pub const EMAIL_TAKEN: &str = "Este e-mail já está em uso";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    HospitalAdmin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Doctor, Role::HospitalAdmin];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "doctor" => Some(Role::Doctor),
            "hospital_admin" => Some(Role::HospitalAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::HospitalAdmin => "hospital_admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Doctor => "Médico",
            Role::HospitalAdmin => "Administrador de hospital",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(token: String, now: DateTime<Utc>) -> Self {
        Self {
            token,
            expires_at: now + Duration::minutes(PASSWORD_RESET_TTL_MINUTES),
        }
    }

    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.token == token && now < self.expires_at
    }
}

/// An account. Password material never leaves the process: the hash and any
/// pending reset token are skipped on serialization.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset: Option<PasswordReset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_verified_email(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Returns `false` when the address was already verified; the original
    /// timestamp is kept in that case.
    pub fn mark_email_as_verified(&mut self) -> bool {
        if self.has_verified_email() {
            return false;
        }
        let now = Utc::now();
        self.email_verified_at = Some(now);
        self.updated_at = now;
        true
    }

    pub fn email_for_verification(&self) -> &str {
        &self.email
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if Role::parse(role).is_some() {
        return Ok(());
    }
    let mut error = ValidationError::new("role");
    error.message = Some(Cow::Borrowed("Perfil inválido"));
    Err(error)
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "O nome deve ter pelo menos 3 caracteres"))]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(custom = "validate_role")]
    pub role: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
    pub password_confirmation: String,
}

impl CreateUser {
    pub fn check(&self) -> Result<(), FieldErrors> {
        FieldErrors::collect(self).into_result()
    }

    pub fn formatted_phone(&self) -> String {
        format_br_phone(&self.phone)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPassword {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResetPassword {
    pub token: String,
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
    pub password_confirmation: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 3, message = "O nome deve ter pelo menos 3 caracteres"))]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PasswordUpdate {
    pub current_password: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
    pub password_confirmation: String,
}
