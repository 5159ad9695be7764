use crate::domain::hospital::Hospital;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait HospitalRepository: Send + Sync {
    async fn next_id(&self) -> Result<u64>;
    async fn save(&self, hospital: Hospital) -> Result<()>;
    async fn find_by_id(&self, id: u64) -> Result<Option<Hospital>>;
    /// Replaces an existing record. Returns `false`, storing nothing, when the
    /// id is no longer present.
    async fn update(&self, hospital: Hospital) -> Result<bool>;
    async fn delete(&self, id: u64) -> Result<Option<Hospital>>;
    async fn list(&self) -> Result<Vec<Hospital>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}
