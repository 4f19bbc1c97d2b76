pub mod auth;
pub mod error;

pub use auth::{AuthState, User};
pub use error::AppError;
