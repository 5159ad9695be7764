pub mod hospital_repository;
pub mod user_repository;
