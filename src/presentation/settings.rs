use crate::domain::user::{PasswordUpdate, ProfileUpdate};
use crate::presentation::auth::StatusResponse;
use crate::presentation::handlers::{ApiError, AppState, CurrentUser};
use crate::presentation::page::Page;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{info, instrument};

#[instrument(skip_all)]
pub async fn profile_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    let CurrentUser(user) = current;
    Page::new("settings/profile")
        .prop("must_verify_email", !user.has_verified_email())?
        .render(&req, &state.asset_version, Some(&user))
}

#[instrument(skip_all)]
pub async fn update_profile(
    state: web::Data<AppState>,
    current: CurrentUser,
    form: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let CurrentUser(user) = current;
    let updated = state
        .auth_service
        .update_profile(&user.id, form.into_inner())
        .await?;
    info!(user_id = %updated.id, "Profile settings saved");
    Ok(HttpResponse::Ok().json(updated))
}

#[instrument(skip_all)]
pub async fn password_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    let CurrentUser(user) = current;
    Page::new("settings/password").render(&req, &state.asset_version, Some(&user))
}

#[instrument(skip_all)]
pub async fn update_password(
    state: web::Data<AppState>,
    current: CurrentUser,
    form: web::Json<PasswordUpdate>,
) -> Result<HttpResponse, ApiError> {
    let CurrentUser(user) = current;
    state
        .auth_service
        .update_password(&user.id, form.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        status: "password-updated",
    }))
}
