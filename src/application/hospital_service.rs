use crate::domain::error::DomainError;
use crate::domain::hospital::{Hospital, HospitalForm, HospitalStatus};
use crate::domain::repository::HospitalRepository;
use anyhow::Result;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of a listing: the hospitals matching the filter and how many exist
/// overall (the admin screen shows both).
#[derive(Debug)]
pub struct HospitalListing {
    pub hospitals: Vec<Hospital>,
    pub total: usize,
}

pub struct HospitalService<R: HospitalRepository> {
    repository: Arc<R>,
}

impl<R: HospitalRepository> HospitalService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, search: Option<&str>) -> Result<HospitalListing> {
        let all = self.repository.list().await?;
        let total = all.len();
        let hospitals: Vec<Hospital> = match search {
            Some(term) => all.into_iter().filter(|h| h.matches(term)).collect(),
            None => all,
        };
        debug!(total, matched = hospitals.len(), "Hospitals listed");
        Ok(HospitalListing { hospitals, total })
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create(&self, form: HospitalForm) -> Result<Hospital> {
        form.check().map_err(DomainError::Validation)?;
        let id = self.repository.next_id().await?;
        let hospital = Hospital::from_form(id, form, Utc::now());
        self.repository.save(hospital.clone()).await?;
        info!(hospital_id = hospital.id, "Hospital created");
        Ok(hospital)
    }

    pub async fn get(&self, id: u64) -> Result<Hospital> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Hospital not found: {}", id)).into())
    }

    #[instrument(skip(self, form))]
    pub async fn update(&self, id: u64, form: HospitalForm) -> Result<Hospital> {
        let mut hospital = self.get(id).await?;
        form.check().map_err(DomainError::Validation)?;
        hospital.apply(form, Utc::now());
        if !self.repository.update(hospital.clone()).await? {
            warn!(hospital_id = id, "Hospital removed while being edited");
            return Err(DomainError::NotFound(format!("Hospital not found: {}", id)).into());
        }
        info!(hospital_id = id, status = ?hospital.status, "Hospital updated");
        Ok(hospital)
    }

    /// Removes the hospital and hands it back so the caller can report what
    /// went away.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<Hospital> {
        let removed = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Hospital not found: {}", id)))?;
        info!(hospital_id = id, name = %removed.name, "Hospital deleted");
        Ok(removed)
    }

    /// Inserts the sample hospital the admin screens were designed against.
    pub async fn seed_sample_data(&self) -> Result<Hospital> {
        let id = self.repository.next_id().await?;
        let created_at = Utc
            .with_ymd_and_hms(2023, 3, 15, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let updated_at = Utc
            .with_ymd_and_hms(2024, 5, 2, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let hospital = Hospital {
            id,
            name: "Hospital São Lucas".to_string(),
            email: "admin@saolucas.com.br".to_string(),
            address: "Rua das Flores, 123 - Centro".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            phone: "+55 (11) 1234-5678".to_string(),
            status: HospitalStatus::Active,
            verified: true,
            admin_name: "Dr. Carlos Silva".to_string(),
            active_shifts: 24,
            created_at,
            updated_at,
        };
        self.repository.save(hospital.clone()).await?;
        info!(hospital_id = id, "Sample hospital seeded");
        Ok(hospital)
    }
}
