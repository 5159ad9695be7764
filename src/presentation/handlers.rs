use crate::application::auth_service::AuthService;
use crate::application::hospital_service::HospitalService;
use crate::data::hospital_repository::InMemoryHospitalRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::hospital::HospitalStatus;
use crate::domain::user::User;
use crate::domain::validation::FieldErrors;
use crate::presentation::middleware::AuthenticatedUser;
use crate::presentation::page::Page;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
    pub hospital_service: HospitalService<InMemoryHospitalRepository>,
    /// Front-end asset version; clients holding another one must reload.
    pub asset_version: String,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(FieldErrors),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();
        let public_msg = match self {
            ApiError::Internal(_) => "Internal error".to_string(),
            _ => error_msg.clone(),
        };

        let details = match self {
            ApiError::Validation(errors) => serde_json::json!({
                "message": errors.to_string(),
                "errors": errors,
            }),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg) => serde_json::json!({ "message": msg }),
            // Internals stay in the log
            ApiError::Internal(_) => serde_json::json!({ "message": "Internal server error" }),
        };

        if status.is_server_error() {
            error!(error = %error_msg, status = %status, "Server error");
        } else {
            warn!(error = %error_msg, status = %status, "Client error");
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: public_msg,
            details,
        })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => ApiError::Validation(errors),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => ApiError::from(domain),
            Err(other) => ApiError::Internal(other.to_string()),
        }
    }
}

type ExtractFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>>>>;

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, ApiError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("Application state not configured".to_string()))
}

// AuthenticatedUser extractor: bearer token accepted by the middleware and
// not revoked since.
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        let state = app_state(req);
        Box::pin(async move {
            let user =
                user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))?;
            if state?.auth_service.is_revoked(&user.token_id).await {
                return Err(ApiError::Unauthorized("Token has been revoked".to_string()));
            }
            Ok(user)
        })
    }
}

/// The authenticated account, loaded from storage.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, payload: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = AuthenticatedUser::from_request(req, payload);
        let state = app_state(req);
        Box::pin(async move {
            let identity = identity.await?;
            let user = state?.auth_service.find_user(&identity.user_id).await?;
            Ok(CurrentUser(user))
        })
    }
}

/// An authenticated account whose e-mail address has been verified.
pub struct VerifiedUser(pub User);

impl FromRequest for VerifiedUser {
    type Error = ApiError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, payload: &mut actix_web::dev::Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            let CurrentUser(user) = current.await?;
            if !user.has_verified_email() {
                return Err(ApiError::Forbidden(
                    "Your email address is not verified".to_string(),
                ));
            }
            Ok(VerifiedUser(user))
        })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip_all)]
pub async fn home(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: Option<CurrentUser>,
) -> Result<HttpResponse, ApiError> {
    let user = user.map(|CurrentUser(user)| user);
    Page::new("welcome").render(&req, &state.asset_version, user.as_ref())
}

#[derive(Serialize)]
struct StatusCount {
    status: HospitalStatus,
    label: &'static str,
    count: usize,
}

#[instrument(skip_all)]
pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
    verified: VerifiedUser,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    let listing = state.hospital_service.list(None).await?;
    let by_status: Vec<StatusCount> = HospitalStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.label(),
            count: listing
                .hospitals
                .iter()
                .filter(|h| h.status == status)
                .count(),
        })
        .collect();
    let active_shifts: u64 = listing
        .hospitals
        .iter()
        .map(|h| u64::from(h.active_shifts))
        .sum();

    Page::new("dashboard")
        .prop("hospital_total", listing.total)?
        .prop("hospitals_by_status", by_status)?
        .prop("active_shifts", active_shifts)?
        .render(&req, &state.asset_version, Some(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(FieldErrors::single("email", "E-mail inválido")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_anyhow_downcast_preserves_domain_errors() {
        let err: anyhow::Error = DomainError::NotFound("Hospital not found: 9".into()).into();
        assert!(matches!(ApiError::from(err), ApiError::NotFound(_)));

        let err = anyhow::anyhow!("disk on fire");
        assert!(matches!(ApiError::from(err), ApiError::Internal(_)));
    }

    #[actix_web::test]
    async fn test_validation_response_body() {
        let resp = ApiError::Validation(FieldErrors::single(
            "password_confirmation",
            "As senhas não coincidem",
        ))
        .error_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["details"]["errors"]["password_confirmation"][0],
            "As senhas não coincidem"
        );
    }

    #[actix_web::test]
    async fn test_internal_error_details_are_hidden() {
        let resp = ApiError::Internal("connection string leaked".into()).error_response();
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal error");
        assert_eq!(json["details"]["message"], "Internal server error");
    }
}
