use crate::domain::hospital::{BRAZILIAN_STATES, HospitalForm, HospitalStatus, HospitalView};
use crate::presentation::handlers::{ApiError, AppState, VerifiedUser};
use crate::presentation::page::Page;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HospitalFilters {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Serialize)]
struct StatusOption {
    value: HospitalStatus,
    label: &'static str,
}

fn status_options() -> Vec<StatusOption> {
    HospitalStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status,
            label: status.label(),
        })
        .collect()
}

fn delete_confirmation(name: &str) -> String {
    format!(
        "Tem certeza que deseja remover o hospital {}? Esta ação não pode ser desfeita e afetará todos os plantões associados.",
        name
    )
}

#[instrument(skip_all, fields(search = ?filters.search))]
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    verified: VerifiedUser,
    filters: web::Query<HospitalFilters>,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    let filters = filters.into_inner();
    let listing = state
        .hospital_service
        .list(filters.search.as_deref())
        .await?;
    info!(total = listing.total, shown = listing.hospitals.len(), "Listing hospitals");

    let hospitals: Vec<HospitalView> = listing.hospitals.into_iter().map(HospitalView::from).collect();
    Page::new("hospital/index")
        .prop("hospitals", hospitals)?
        .prop("total", listing.total)?
        .prop("filters", filters)?
        .render(&req, &state.asset_version, Some(&user))
}

#[instrument(skip_all)]
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    verified: VerifiedUser,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    Page::new("hospital/create")
        .prop("statuses", status_options())?
        .prop("states", BRAZILIAN_STATES)?
        .render(&req, &state.asset_version, Some(&user))
}

#[instrument(skip_all, fields(name = %form.name))]
pub async fn store(
    state: web::Data<AppState>,
    verified: VerifiedUser,
    form: web::Json<HospitalForm>,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    let hospital = state
        .hospital_service
        .create(form.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create hospital");
            ApiError::from(e)
        })?;
    info!(hospital_id = hospital.id, user_id = %user.id, "Hospital created");
    Ok(HttpResponse::Created().json(HospitalView::from(hospital)))
}

#[instrument(skip_all, fields(hospital_id = %*path))]
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    verified: VerifiedUser,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    let hospital = state.hospital_service.get(path.into_inner()).await?;
    let confirmation = delete_confirmation(&hospital.name);
    Page::new("hospital/edit")
        .prop("hospital", HospitalView::from(hospital))?
        .prop("statuses", status_options())?
        .prop("states", BRAZILIAN_STATES)?
        .prop("delete_confirmation", confirmation)?
        .render(&req, &state.asset_version, Some(&user))
}

#[instrument(skip_all, fields(hospital_id = %*path))]
pub async fn update(
    state: web::Data<AppState>,
    verified: VerifiedUser,
    path: web::Path<u64>,
    form: web::Json<HospitalForm>,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    let id = path.into_inner();
    let hospital = state
        .hospital_service
        .update(id, form.into_inner())
        .await
        .map_err(|e| {
            error!(hospital_id = id, error = %e, "Failed to update hospital");
            ApiError::from(e)
        })?;
    info!(hospital_id = id, user_id = %user.id, "Hospital updated");
    Ok(HttpResponse::Ok().json(HospitalView::from(hospital)))
}

#[instrument(skip_all, fields(hospital_id = %*path))]
pub async fn destroy(
    state: web::Data<AppState>,
    verified: VerifiedUser,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let VerifiedUser(user) = verified;
    let removed = state.hospital_service.delete(path.into_inner()).await?;
    info!(hospital_id = removed.id, user_id = %user.id, "Hospital removed");
    Ok(HttpResponse::NoContent().finish())
}
