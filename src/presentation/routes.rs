//! Route table.
//!
//! | Area       | Guard            |
//! |------------|------------------|
//! | `/`, auth  | none             |
//! | settings   | authenticated    |
//! | dashboard, hospitals | authenticated, verified e-mail |
//!
//! Guards live in the handler extractors (`CurrentUser`, `VerifiedUser`).
//! Hospitals get the resource routes minus `show`.

use crate::presentation::handlers::{ApiError, dashboard, health_check, home};
use crate::presentation::{auth, hospitals, settings};
use actix_web::web;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, req| ApiError::NotFound(format!("No route for {}", req.path())).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .route("/", web::get().to(home))
        .route("/health", web::get().to(health_check))
        // auth
        .service(
            web::resource("/register")
                .name("register")
                .route(web::get().to(auth::register_page))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .name("login")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::post().to(auth::logout))
        .route("/forgot-password", web::post().to(auth::forgot_password))
        .route("/reset-password", web::post().to(auth::reset_password))
        .route(
            "/reset-password/{token}",
            web::get().to(auth::reset_password_page),
        )
        .route(
            "/email/verification-notification",
            web::post().to(auth::send_verification),
        )
        .route("/verify-email", web::get().to(auth::verify_email))
        // app
        .route("/dashboard", web::get().to(dashboard))
        .service(
            web::scope("/hospitals")
                .service(
                    web::resource("")
                        .name("hospitals.index")
                        .route(web::get().to(hospitals::index))
                        .route(web::post().to(hospitals::store)),
                )
                .route("/create", web::get().to(hospitals::create))
                .route("/{id}/edit", web::get().to(hospitals::edit))
                .service(
                    web::resource("/{id}")
                        .route(web::put().to(hospitals::update))
                        .route(web::patch().to(hospitals::update))
                        .route(web::delete().to(hospitals::destroy)),
                ),
        )
        // settings
        .service(
            web::scope("/settings")
                .service(
                    web::resource("/profile")
                        .route(web::get().to(settings::profile_page))
                        .route(web::patch().to(settings::update_profile)),
                )
                .service(
                    web::resource("/password")
                        .route(web::get().to(settings::password_page))
                        .route(web::put().to(settings::update_password)),
                ),
        );
}
