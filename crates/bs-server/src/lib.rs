pub mod error;
pub mod routes;
pub mod ui;

pub use routes::router;
