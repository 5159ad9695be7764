use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{EMAIL_TAKEN, User};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

#[derive(Default)]
struct UserStore {
    by_id: HashMap<String, User>,
    // email -> id; kept in step with `by_id` so lookups by the unique key
    // don't scan every account.
    by_email: HashMap<String, String>,
}

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<UserStore>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(UserStore::default())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id, email = %user.email))]
    async fn save_user(&self, user: User) -> Result<()> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        // Uniqueness is decided under the write lock
        let taken = storage
            .by_email
            .get(&user.email)
            .is_some_and(|owner| *owner != user.id);
        if taken {
            warn!("Email already owned by another account");
            return Err(DomainError::field("email", EMAIL_TAKEN).into());
        }
        let previous_email = storage.by_id.get(&user.id).map(|u| u.email.clone());
        if let Some(previous) = previous_email.filter(|e| *e != user.email) {
            trace!(previous_email = %previous, "Dropping stale email index entry");
            storage.by_email.remove(&previous);
        }
        storage.by_email.insert(user.email.clone(), user.id.clone());
        debug!(role = user.role.as_str(), "User saved to memory storage");
        storage.by_id.insert(user.id.clone(), user);
        Ok(())
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        let user = storage
            .by_email
            .get(email)
            .and_then(|id| storage.by_id.get(id))
            .cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, "User found in storage"),
            None => trace!("User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        let user = storage.by_id.get(id).cloned();
        if user.is_none() {
            trace!("User not found in storage");
        }
        Ok(user)
    }
}
