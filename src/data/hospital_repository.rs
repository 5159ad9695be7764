use crate::domain::hospital::Hospital;
use crate::domain::repository::HospitalRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryHospitalRepository {
    storage: Arc<RwLock<BTreeMap<u64, Hospital>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryHospitalRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for InMemoryHospitalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HospitalRepository for InMemoryHospitalRepository {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    #[instrument(skip(self, hospital), fields(hospital_id = hospital.id))]
    async fn save(&self, hospital: Hospital) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(hospital.id, hospital);
        debug!("Hospital saved to memory storage");
        Ok(())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Hospital>> {
        let storage = self.storage.read().await;
        Ok(storage.get(&id).cloned())
    }

    #[instrument(skip(self, hospital), fields(hospital_id = hospital.id))]
    async fn update(&self, hospital: Hospital) -> Result<bool> {
        let mut storage = self.storage.write().await;
        match storage.get_mut(&hospital.id) {
            Some(slot) => {
                *slot = hospital;
                debug!("Hospital updated in memory storage");
                Ok(true)
            }
            None => {
                trace!("Hospital vanished before update");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: u64) -> Result<Option<Hospital>> {
        let mut storage = self.storage.write().await;
        let removed = storage.remove(&id);
        trace!(found = removed.is_some(), "Hospital removal attempted");
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<Hospital>> {
        let storage = self.storage.read().await;
        Ok(storage.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hospital::HospitalStatus;
    use chrono::Utc;

    fn hospital(id: u64, name: &str) -> Hospital {
        let now = Utc::now();
        Hospital {
            id,
            name: name.to_string(),
            email: "contato@hospital.com.br".to_string(),
            address: "Av. Brasil, 100".to_string(),
            city: "Recife".to_string(),
            state: "PE".to_string(),
            phone: "+55 (81) 3333-4444".to_string(),
            status: HospitalStatus::Active,
            verified: true,
            admin_name: "Dra. Marta Lima".to_string(),
            active_shifts: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_next_id_is_sequential() {
        let repo = InMemoryHospitalRepository::new();
        assert_eq!(repo.next_id().await.unwrap(), 1);
        assert_eq!(repo.next_id().await.unwrap(), 2);

        let clone = repo.clone();
        assert_eq!(clone.next_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryHospitalRepository::new();
        repo.save(hospital(1, "Hospital Real")).await.unwrap();

        let found = repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.name, "Hospital Real");
        assert!(repo.find_by_id(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let repo = InMemoryHospitalRepository::new();
        repo.save(hospital(3, "C")).await.unwrap();
        repo.save(hospital(1, "A")).await.unwrap();
        repo.save(hospital(2, "B")).await.unwrap();

        let ids: Vec<u64> = repo.list().await.unwrap().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_hospital() {
        let repo = InMemoryHospitalRepository::new();
        repo.save(hospital(1, "A")).await.unwrap();

        let removed = repo.delete(1).await.unwrap();
        assert_eq!(removed.unwrap().id, 1);
        assert!(repo.delete(1).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_does_not_resurrect_deleted_hospital() {
        let repo = InMemoryHospitalRepository::new();
        repo.save(hospital(1, "A")).await.unwrap();

        let mut edited = repo.find_by_id(1).await.unwrap().unwrap();
        repo.delete(1).await.unwrap();
        edited.name = "A2".to_string();

        assert!(!repo.update(edited).await.unwrap());
        assert!(repo.find_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_existing_record() {
        let repo = InMemoryHospitalRepository::new();
        repo.save(hospital(1, "A")).await.unwrap();

        assert!(repo.update(hospital(1, "B")).await.unwrap());
        assert_eq!(repo.find_by_id(1).await.unwrap().unwrap().name, "B");
    }

    #[tokio::test]
    async fn test_concurrent_ids_are_unique() {
        let repo = InMemoryHospitalRepository::new();
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repo_clone = repo.clone();
                tokio::spawn(async move { repo_clone.next_id().await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
