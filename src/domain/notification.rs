use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Outbound account notifications. Tokens are handed over raw; building the
/// link and delivering it is the implementation's business.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email_verification(&self, user: &User, token: &str) -> Result<()>;
    async fn send_password_reset(&self, user: &User, token: &str) -> Result<()>;
}
