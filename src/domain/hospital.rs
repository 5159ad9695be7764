use crate::domain::phone::{format_br_phone, validate_phone};
use crate::domain::validation::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Federative units accepted in the `state` field.
pub const BRAZILIAN_STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HospitalStatus {
    Active,
    Pending,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Outline,
}

impl HospitalStatus {
    pub const ALL: [HospitalStatus; 3] = [
        HospitalStatus::Active,
        HospitalStatus::Pending,
        HospitalStatus::Inactive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HospitalStatus::Active => "Ativo",
            HospitalStatus::Pending => "Pendente",
            HospitalStatus::Inactive => "Inativo",
        }
    }

    pub fn badge(&self) -> BadgeVariant {
        match self {
            HospitalStatus::Active => BadgeVariant::Default,
            HospitalStatus::Pending => BadgeVariant::Secondary,
            HospitalStatus::Inactive => BadgeVariant::Outline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub status: HospitalStatus,
    pub verified: bool,
    pub admin_name: String,
    pub active_shifts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hospital {
    pub fn from_form(id: u64, form: HospitalForm, now: DateTime<Utc>) -> Self {
        Self {
            id,
            phone: format_br_phone(&form.phone),
            name: form.name,
            email: form.email.trim().to_lowercase(),
            address: form.address,
            city: form.city,
            state: form.state.to_uppercase(),
            status: form.status.unwrap_or(HospitalStatus::Pending),
            verified: form.verified.unwrap_or(false),
            admin_name: form.admin_name,
            active_shifts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the editable fields; `status` and `verified` are kept when
    /// the form leaves them out.
    pub fn apply(&mut self, form: HospitalForm, now: DateTime<Utc>) {
        self.phone = format_br_phone(&form.phone);
        self.name = form.name;
        self.email = form.email.trim().to_lowercase();
        self.address = form.address;
        self.city = form.city;
        self.state = form.state.to_uppercase();
        self.admin_name = form.admin_name;
        if let Some(status) = form.status {
            self.status = status;
        }
        if let Some(verified) = form.verified {
            self.verified = verified;
        }
        self.updated_at = now;
    }

    /// Case-insensitive substring match on name, city or administrator name.
    /// The term is used as typed, so an empty term matches every hospital.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.name, &self.city, &self.admin_name]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    pub fn shift_summary(&self) -> String {
        if self.active_shifts == 1 {
            "1 plantão ativo".to_string()
        } else {
            format!("{} plantões ativos", self.active_shifts)
        }
    }

    pub fn shift_badge(&self) -> BadgeVariant {
        if self.active_shifts > 0 {
            BadgeVariant::Default
        } else {
            BadgeVariant::Outline
        }
    }
}

/// Hospital card as the admin listing renders it.
#[derive(Debug, Serialize)]
pub struct HospitalView {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub status_label: &'static str,
    pub status_variant: BadgeVariant,
    pub shift_summary: String,
    pub shift_variant: BadgeVariant,
    pub created_on: String,
    pub updated_on: String,
}

impl From<Hospital> for HospitalView {
    fn from(hospital: Hospital) -> Self {
        Self {
            status_label: hospital.status.label(),
            status_variant: hospital.status.badge(),
            shift_summary: hospital.shift_summary(),
            shift_variant: hospital.shift_badge(),
            created_on: hospital.created_at.format("%d/%m/%Y").to_string(),
            updated_on: hospital.updated_at.format("%d/%m/%Y").to_string(),
            hospital,
        }
    }
}

fn validate_state(state: &str) -> Result<(), ValidationError> {
    let upper = state.to_uppercase();
    if BRAZILIAN_STATES.contains(&upper.as_str()) {
        return Ok(());
    }
    let mut error = ValidationError::new("state");
    error.message = Some(Cow::Borrowed("Estado inválido"));
    Err(error)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HospitalForm {
    #[validate(length(min = 3, message = "O nome deve ter pelo menos 3 caracteres"))]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "Informe o endereço"))]
    pub address: String,
    #[validate(length(min = 1, message = "Informe a cidade"))]
    pub city: String,
    #[validate(custom = "validate_state")]
    pub state: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(length(min = 1, message = "Informe o administrador responsável"))]
    pub admin_name: String,
    #[serde(default)]
    pub status: Option<HospitalStatus>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl HospitalForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        FieldErrors::collect(self).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> HospitalForm {
        HospitalForm {
            name: "Hospital São Lucas".to_string(),
            email: "Admin@SaoLucas.com.br".to_string(),
            address: "Rua das Flores, 123 - Centro".to_string(),
            city: "São Paulo".to_string(),
            state: "sp".to_string(),
            phone: "(11) 1234-5678".to_string(),
            admin_name: "Dr. Carlos Silva".to_string(),
            status: None,
            verified: None,
        }
    }

    #[test]
    fn test_status_badge_lookup() {
        assert_eq!(HospitalStatus::Active.label(), "Ativo");
        assert_eq!(HospitalStatus::Active.badge(), BadgeVariant::Default);
        assert_eq!(HospitalStatus::Pending.label(), "Pendente");
        assert_eq!(HospitalStatus::Pending.badge(), BadgeVariant::Secondary);
        assert_eq!(HospitalStatus::Inactive.label(), "Inativo");
        assert_eq!(HospitalStatus::Inactive.badge(), BadgeVariant::Outline);
    }

    #[test]
    fn test_from_form_defaults_and_normalization() {
        let hospital = Hospital::from_form(7, form(), Utc::now());

        assert_eq!(hospital.id, 7);
        assert_eq!(hospital.status, HospitalStatus::Pending);
        assert!(!hospital.verified);
        assert_eq!(hospital.active_shifts, 0);
        assert_eq!(hospital.state, "SP");
        assert_eq!(hospital.email, "admin@saolucas.com.br");
        assert_eq!(hospital.phone, "+55 (11) 1234-5678");
    }

    #[test]
    fn test_apply_keeps_status_when_omitted() {
        let mut hospital = Hospital::from_form(1, form(), Utc::now());
        hospital.status = HospitalStatus::Active;

        let mut update = form();
        update.name = "Hospital São Lucas II".to_string();
        hospital.apply(update, Utc::now());

        assert_eq!(hospital.name, "Hospital São Lucas II");
        assert_eq!(hospital.status, HospitalStatus::Active);

        let mut update = form();
        update.status = Some(HospitalStatus::Inactive);
        update.verified = Some(true);
        hospital.apply(update, Utc::now());
        assert_eq!(hospital.status, HospitalStatus::Inactive);
        assert!(hospital.verified);
    }

    #[test]
    fn test_matches_name_city_and_admin() {
        let hospital = Hospital::from_form(1, form(), Utc::now());

        assert!(hospital.matches(""));
        assert!(hospital.matches("lucas"));
        assert!(hospital.matches("SÃO PAULO"));
        assert!(hospital.matches("carlos"));
        assert!(!hospital.matches("Rua das Flores"));
        assert!(!hospital.matches("Curitiba"));
    }

    #[test]
    fn test_matches_uses_term_verbatim() {
        let mut hospital = Hospital::from_form(1, form(), Utc::now());
        assert!(hospital.matches(" "));
        assert!(!hospital.matches(" lucas "));

        hospital.name = "Santa".to_string();
        hospital.city = "Recife".to_string();
        hospital.admin_name = "Marta".to_string();
        assert!(!hospital.matches(" "));
    }

    #[test]
    fn test_form_phone_needs_ten_digits() {
        let mut bad = form();
        bad.phone = "abcdefghij".to_string();
        assert_eq!(bad.check().unwrap_err().first("phone"), Some("Telefone inválido"));

        bad.phone = "(11) 1234-5678".to_string();
        assert!(bad.check().is_ok());

        bad.phone = "(11) 1234".to_string();
        assert!(bad.check().is_err());
    }

    #[test]
    fn test_shift_summary_pluralization() {
        let mut hospital = Hospital::from_form(1, form(), Utc::now());
        assert_eq!(hospital.shift_summary(), "0 plantões ativos");
        assert_eq!(hospital.shift_badge(), BadgeVariant::Outline);

        hospital.active_shifts = 1;
        assert_eq!(hospital.shift_summary(), "1 plantão ativo");
        assert_eq!(hospital.shift_badge(), BadgeVariant::Default);

        hospital.active_shifts = 24;
        assert_eq!(hospital.shift_summary(), "24 plantões ativos");
    }

    #[test]
    fn test_form_rejects_unknown_state() {
        let mut bad = form();
        bad.state = "XX".to_string();
        bad.address = String::new();

        let errors = bad.check().unwrap_err();
        assert_eq!(errors.first("state"), Some("Estado inválido"));
        assert_eq!(errors.first("address"), Some("Informe o endereço"));
        assert!(form().check().is_ok());
    }

    #[test]
    fn test_view_flattens_hospital_fields() {
        let view = HospitalView::from(Hospital::from_form(3, form(), Utc::now()));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["status_label"], "Pendente");
        assert_eq!(json["status_variant"], "secondary");
        assert_eq!(json["shift_variant"], "outline");
    }
}
