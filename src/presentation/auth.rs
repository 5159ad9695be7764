use crate::domain::user::{CreateUser, ForgotPassword, LoginRequest, ResetPassword, Role, User};
use crate::presentation::handlers::{ApiError, AppState, CurrentUser};
use crate::presentation::middleware::AuthenticatedUser;
use crate::presentation::page::Page;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
struct RoleOption {
    value: &'static str,
    label: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordQuery {
    #[serde(default)]
    pub email: Option<String>,
}

#[instrument(skip_all)]
pub async fn register_page(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let roles: Vec<RoleOption> = Role::ALL
        .into_iter()
        .map(|role| RoleOption {
            value: role.as_str(),
            label: role.label(),
        })
        .collect();
    Page::new("auth/register")
        .prop("roles", roles)?
        .render(&req, &state.asset_version, None)
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let user = state
        .auth_service
        .register_user(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;
    let access_token = state.auth_service.issue_token(&user.id)?;

    info!(user_id = %user.id, email = %user.email, "User registered successfully");
    Ok(HttpResponse::Created().json(RegisterResponse {
        user,
        access_token,
        token_type: "Bearer",
    }))
}

#[instrument(skip_all)]
pub async fn login_page(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Page::new("auth/login")
        .prop("can_reset_password", true)?
        .render(&req, &state.asset_version, None)
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let token = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to login");
            ApiError::from(e)
        })?;

    info!("Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
    }))
}

#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn logout(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state
        .auth_service
        .logout(&identity.token_id, identity.expires_at)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip_all)]
pub async fn forgot_password(
    state: web::Data<AppState>,
    req: web::Json<ForgotPassword>,
) -> Result<HttpResponse, ApiError> {
    state.auth_service.forgot_password(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        status: "Se o e-mail estiver cadastrado, enviaremos um link de redefinição de senha",
    }))
}

/// Landing page of the link in the password reset e-mail. The token is only
/// checked when the form is submitted.
#[instrument(skip_all)]
pub async fn reset_password_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    token: web::Path<String>,
    query: web::Query<ResetPasswordQuery>,
) -> Result<HttpResponse, ApiError> {
    Page::new("auth/reset-password")
        .prop("token", token.into_inner())?
        .prop("email", query.into_inner().email.unwrap_or_default())?
        .render(&req, &state.asset_version, None)
}

#[instrument(skip_all)]
pub async fn reset_password(
    state: web::Data<AppState>,
    req: web::Json<ResetPassword>,
) -> Result<HttpResponse, ApiError> {
    let user = state.auth_service.reset_password(req.into_inner()).await?;
    info!(user_id = %user.id, "Password reset via link");
    Ok(HttpResponse::Ok().json(StatusResponse {
        status: "password-reset",
    }))
}

#[instrument(skip_all)]
pub async fn send_verification(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    let CurrentUser(user) = current;
    let sent = state.auth_service.send_verification(&user.id).await?;
    if sent {
        Ok(HttpResponse::Accepted().json(StatusResponse {
            status: "verification-link-sent",
        }))
    } else {
        Ok(HttpResponse::Ok().json(StatusResponse {
            status: "already-verified",
        }))
    }
}

#[instrument(skip_all)]
pub async fn verify_email(
    state: web::Data<AppState>,
    query: web::Query<VerifyEmailQuery>,
) -> Result<HttpResponse, ApiError> {
    let user = state.auth_service.verify_email(&query.token).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "verified",
        "user": user,
    })))
}
