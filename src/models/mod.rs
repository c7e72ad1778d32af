pub mod access_token;
pub mod application;
pub mod appointment;
pub mod customer;
pub mod user;
pub mod vehicle;

pub use access_token::*;
pub use application::*;
pub use appointment::*;
pub use customer::*;
pub use user::*;
pub use vehicle::*;
