use crate::domain::error::DomainError;
use crate::domain::notification::Notifier;
use crate::domain::phone::format_br_phone;
use crate::domain::repository::UserRepository;
use crate::domain::user::{
    CreateUser, EMAIL_TAKEN, ForgotPassword, LoginRequest, PasswordReset, PasswordUpdate,
    ProfileUpdate, ResetPassword, Role, User, normalize_email,
};
use crate::domain::validation::FieldErrors;
use crate::infrastructure::security::{
    Claims, TokenPurpose, generate_token, hash_password, validate_token, verify_password,
};
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const VERIFICATION_TTL_SECS: u64 = 60 * 60;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_RESET_TOKEN: &str = "Este link de redefinição de senha é inválido";
const WRONG_CURRENT_PASSWORD: &str = "A senha atual está incorreta";

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    notifier: Arc<dyn Notifier>,
    jwt_secret: String,
    token_ttl_secs: u64,
    // jti -> token expiry (unix seconds); entries go once the token expires
    revoked_tokens: RwLock<HashMap<String, u64>>,
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, notifier: Arc<dyn Notifier>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            notifier,
            jwt_secret,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            revoked_tokens: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_token_ttl(mut self, ttl_secs: u64) -> Self {
        self.token_ttl_secs = ttl_secs;
        self
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    #[instrument(skip(self, req), fields(email = %req.email, role = %req.role))]
    pub async fn register_user(&self, req: CreateUser) -> Result<User> {
        trace!("Starting user registration");
        let mut errors = match req.check() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors,
        };

        let email = normalize_email(&req.email);
        if errors.get("email").is_none()
            && self.user_repository.find_user_by_email(&email).await?.is_some()
        {
            warn!(email = %email, "User already exists");
            errors.add("email", EMAIL_TAKEN);
        }
        errors.into_result().map_err(DomainError::Validation)?;

        let role = Role::parse(&req.role)
            .ok_or_else(|| DomainError::field("role", "Perfil inválido"))?;
        let password_hash = self.hash(&req.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: req.name.trim().to_string(),
            phone: req.formatted_phone(),
            email,
            password_hash,
            role,
            email_verified_at: None,
            password_reset: None,
            created_at: now,
            updated_at: now,
        };

        debug!(user_id = %user.id, "Saving user to repository");
        self.user_repository.save_user(user.clone()).await?;
        self.send_verification_to(&user).await?;

        info!(user_id = %user.id, email = %user.email, "User registered successfully");
        Ok(user)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        trace!("Starting login");
        let email = normalize_email(&req.email);

        let user = self
            .user_repository
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, "User not found during login");
                DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        if !self.verify(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        let token = self.issue_token(&user.id)?;
        info!(user_id = %user.id, "Login successful");
        Ok(token)
    }

    /// Mints an access token for an existing account.
    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        let token = generate_token(
            user_id,
            TokenPurpose::Access,
            None,
            self.token_ttl_secs,
            &self.jwt_secret,
        )
        .map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e))
        })?;
        Ok(token)
    }

    /// Revokes the access token `token_id` until `expires_at`. Revocations of
    /// tokens that have since expired are dropped on the way.
    #[instrument(skip(self))]
    pub async fn logout(&self, token_id: &str, expires_at: u64) -> Result<()> {
        let now = unix_now();
        let mut revoked = self.revoked_tokens.write().await;
        let before = revoked.len();
        revoked.retain(|_, exp| *exp > now);
        if revoked.len() < before {
            debug!(pruned = before - revoked.len(), "Expired revocations dropped");
        }
        if expires_at > now {
            revoked.insert(token_id.to_string(), expires_at);
        }
        info!("Access token revoked");
        Ok(())
    }

    pub async fn is_revoked(&self, token_id: &str) -> bool {
        let now = unix_now();
        self.revoked_tokens
            .read()
            .await
            .get(token_id)
            .is_some_and(|exp| *exp > now)
    }

    #[instrument(skip(self))]
    pub async fn find_user(&self, user_id: &str) -> Result<User> {
        let user = self
            .user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "Token subject no longer exists");
                DomainError::Unauthorized("User not found".to_string())
            })?;
        Ok(user)
    }

    /// Re-sends the verification link. Returns `false` when the address is
    /// already verified and nothing was sent.
    #[instrument(skip(self))]
    pub async fn send_verification(&self, user_id: &str) -> Result<bool> {
        let user = self.find_user(user_id).await?;
        if user.has_verified_email() {
            debug!("Email already verified, skipping notification");
            return Ok(false);
        }
        self.send_verification_to(&user).await?;
        Ok(true)
    }

    async fn send_verification_to(&self, user: &User) -> Result<()> {
        let token = generate_token(
            &user.id,
            TokenPurpose::VerifyEmail,
            Some(user.email_for_verification()),
            VERIFICATION_TTL_SECS,
            &self.jwt_secret,
        )
        .map_err(|e| DomainError::Internal(format!("Failed to generate token: {}", e)))?;
        self.notifier.send_email_verification(user, &token).await
    }

    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<User> {
        let claims: Claims = validate_token(token, TokenPurpose::VerifyEmail, &self.jwt_secret)
            .map_err(|e| {
                warn!(error = %e, "Rejected verification token");
                DomainError::Forbidden("Invalid or expired verification link".to_string())
            })?;

        let mut user = self
            .user_repository
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User not found: {}", claims.sub)))?;

        if claims.email.as_deref() != Some(user.email_for_verification()) {
            warn!(user_id = %user.id, "Verification link issued for a previous address");
            return Err(
                DomainError::Forbidden("Invalid or expired verification link".to_string()).into(),
            );
        }

        if user.mark_email_as_verified() {
            self.user_repository.save_user(user.clone()).await?;
            info!(user_id = %user.id, "Email verified");
        }
        Ok(user)
    }

    /// Starts a password reset. Unknown addresses are ignored so the caller
    /// cannot learn which accounts exist.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn forgot_password(&self, req: ForgotPassword) -> Result<()> {
        let email = normalize_email(&req.email);
        let Some(mut user) = self.user_repository.find_user_by_email(&email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = Uuid::new_v4().simple().to_string();
        user.password_reset = Some(PasswordReset::new(token.clone(), Utc::now()));
        self.user_repository.save_user(user.clone()).await?;
        self.notifier.send_password_reset(&user, &token).await?;
        info!(user_id = %user.id, "Password reset link issued");
        Ok(())
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn reset_password(&self, req: ResetPassword) -> Result<User> {
        FieldErrors::collect(&req)
            .into_result()
            .map_err(DomainError::Validation)?;

        let email = normalize_email(&req.email);
        let user = self.user_repository.find_user_by_email(&email).await?;
        let now = Utc::now();
        let mut user = match user {
            Some(user)
                if user
                    .password_reset
                    .as_ref()
                    .is_some_and(|reset| reset.accepts(&req.token, now)) =>
            {
                user
            }
            _ => {
                warn!("Rejected password reset token");
                return Err(DomainError::field("email", INVALID_RESET_TOKEN).into());
            }
        };

        user.password_hash = self.hash(&req.password)?;
        user.password_reset = None;
        user.updated_at = now;
        self.user_repository.save_user(user.clone()).await?;
        info!(user_id = %user.id, "Password reset completed");
        Ok(user)
    }

    #[instrument(skip(self, req))]
    pub async fn update_profile(&self, user_id: &str, req: ProfileUpdate) -> Result<User> {
        let mut user = self.find_user(user_id).await?;
        let mut errors = FieldErrors::collect(&req);

        let email = normalize_email(&req.email);
        if errors.get("email").is_none() && email != user.email {
            let taken = self
                .user_repository
                .find_user_by_email(&email)
                .await?
                .is_some_and(|other| other.id != user.id);
            if taken {
                errors.add("email", EMAIL_TAKEN);
            }
        }
        errors.into_result().map_err(DomainError::Validation)?;

        if email != user.email {
            debug!(user_id = %user.id, "Email changed, verification reset");
            user.email_verified_at = None;
            user.email = email;
        }
        user.name = req.name.trim().to_string();
        user.phone = format_br_phone(&req.phone);
        user.updated_at = Utc::now();

        self.user_repository.save_user(user.clone()).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    #[instrument(skip(self, req))]
    pub async fn update_password(&self, user_id: &str, req: PasswordUpdate) -> Result<()> {
        let mut user = self.find_user(user_id).await?;

        let mut errors = FieldErrors::collect(&req);
        if !self.verify(&req.current_password, &user.password_hash)? {
            warn!(user_id = %user.id, "Wrong current password on password change");
            errors.add("current_password", WRONG_CURRENT_PASSWORD);
        }
        errors.into_result().map_err(DomainError::Validation)?;

        user.password_hash = self.hash(&req.password)?;
        user.updated_at = Utc::now();
        self.user_repository.save_user(user).await?;
        info!(user_id = user_id, "Password updated");
        Ok(())
    }

    fn hash(&self, password: &str) -> Result<String> {
        let hash = hash_password(password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;
        Ok(hash)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let valid = verify_password(password, hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;
        Ok(valid)
    }
}
