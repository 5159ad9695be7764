pub mod auth;
pub mod handlers;
pub mod hospitals;
pub mod middleware;
pub mod page;
pub mod routes;
pub mod settings;
