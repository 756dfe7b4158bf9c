pub mod error;
pub mod models;
pub mod services;

pub use error::{BuildServerError, Result};
pub use services::BuildServer;
