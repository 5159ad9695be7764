use crate::domain::notification::Notifier;
use crate::domain::user::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

/// Delivers notifications to the log. Stands in for a mailer in development.
pub struct LoggingNotifier {
    app_url: String,
}

impl LoggingNotifier {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
        }
    }

    fn base(&self) -> Result<Url> {
        Url::parse(&self.app_url).with_context(|| format!("Invalid APP_URL: {}", self.app_url))
    }

    /// `segments` are appended to the app URL path; query values are
    /// percent-encoded.
    fn link(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String> {
        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("APP_URL cannot carry a path: {}", self.app_url))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    pub fn verification_link(&self, token: &str) -> Result<String> {
        self.link(&["verify-email"], &[("token", token)])
    }

    pub fn reset_link(&self, token: &str, email: &str) -> Result<String> {
        self.link(&["reset-password", token], &[("email", email)])
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    #[instrument(skip(self, user, token), fields(user_id = %user.id))]
    async fn send_email_verification(&self, user: &User, token: &str) -> Result<()> {
        info!(
            to = user.email_for_verification(),
            link = %self.verification_link(token)?,
            "Email verification notification"
        );
        Ok(())
    }

    #[instrument(skip(self, user, token), fields(user_id = %user.id))]
    async fn send_password_reset(&self, user: &User, token: &str) -> Result<()> {
        info!(
            to = %user.email,
            link = %self.reset_link(token, &user.email)?,
            "Password reset notification"
        );
        Ok(())
    }
}
