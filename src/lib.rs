pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod models;
pub mod pagination;
pub mod repositories;

pub use config::AppConfig;
pub use database::Database;
