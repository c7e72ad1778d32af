pub mod access_token_repository;
pub mod application_repository;
pub mod appointment_repository;
pub mod customer_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use access_token_repository::*;
pub use application_repository::*;
pub use appointment_repository::*;
pub use customer_repository::*;
pub use user_repository::*;
pub use vehicle_repository::*;
