#![allow(dead_code)]

use actix_web::web;
use anyhow::Result;
use async_trait::async_trait;
use plantao_api::application::auth_service::AuthService;
use plantao_api::application::hospital_service::HospitalService;
use plantao_api::data::hospital_repository::InMemoryHospitalRepository;
use plantao_api::data::user_repository::InMemoryUserRepository;
use plantao_api::domain::notification::Notifier;
use plantao_api::domain::user::{CreateUser, LoginRequest, User};
use plantao_api::presentation::handlers::AppState;
use std::sync::{Arc, Mutex};

pub const JWT_SECRET: &str = "test-secret-key-for-integration-tests";
pub const ASSET_VERSION: &str = "test-assets";
pub const PASSWORD: &str = "senha123";

/// Keeps every token the services try to deliver so tests can follow links.
#[derive(Default)]
pub struct RecordingNotifier {
    verifications: Mutex<Vec<(String, String)>>,
    resets: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn verification_token_for(&self, email: &str) -> Option<String> {
        self.verifications
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn reset_token_for(&self, email: &str) -> Option<String> {
        self.resets
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn verification_count(&self) -> usize {
        self.verifications.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email_verification(&self, user: &User, token: &str) -> Result<()> {
        self.verifications
            .lock()
            .unwrap()
            .push((user.email.clone(), token.to_string()));
        Ok(())
    }

    async fn send_password_reset(&self, user: &User, token: &str) -> Result<()> {
        self.resets
            .lock()
            .unwrap()
            .push((user.email.clone(), token.to_string()));
        Ok(())
    }
}

pub fn build_state() -> (web::Data<AppState>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let auth_service = AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        notifier.clone(),
        JWT_SECRET.to_string(),
    );
    let hospital_service = HospitalService::new(Arc::new(InMemoryHospitalRepository::new()));

    let state = web::Data::new(AppState {
        auth_service: Arc::new(auth_service),
        hospital_service,
        asset_version: ASSET_VERSION.to_string(),
    });
    (state, notifier)
}

pub fn registration(email: &str) -> CreateUser {
    CreateUser {
        name: "Dra. Helena Martins".to_string(),
        email: email.to_string(),
        phone: "11987654321".to_string(),
        role: "doctor".to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
    }
}

/// Registers `email`, follows its verification link and logs in.
pub async fn verified_token(
    state: &web::Data<AppState>,
    notifier: &RecordingNotifier,
    email: &str,
) -> String {
    state
        .auth_service
        .register_user(registration(email))
        .await
        .unwrap();
    let link = notifier.verification_token_for(email).unwrap();
    state.auth_service.verify_email(&link).await.unwrap();
    login_token(state, email).await
}

/// Registers `email` without verifying it and logs in.
pub async fn unverified_token(state: &web::Data<AppState>, email: &str) -> String {
    state
        .auth_service
        .register_user(registration(email))
        .await
        .unwrap();
    login_token(state, email).await
}

async fn login_token(state: &web::Data<AppState>, email: &str) -> String {
    state
        .auth_service
        .login(LoginRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
