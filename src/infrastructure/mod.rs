pub mod config;
pub mod logging;
pub mod notifier;
pub mod security;
