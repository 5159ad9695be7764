pub mod error;
pub mod hospital;
pub mod notification;
pub mod phone;
pub mod repository;
pub mod user;
pub mod validation;
