pub mod auth_service;
pub mod hospital_service;
