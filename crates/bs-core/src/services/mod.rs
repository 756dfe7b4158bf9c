pub mod build_server;
pub mod cache_key;
pub mod config_loader;
pub mod discovery;
pub mod fakes;
pub mod health;
pub mod log_tailer;
pub mod probe;
pub mod process;
pub mod reconciler;
pub mod status_store;
pub mod supervisor;
pub mod systemctl;
pub mod trigger;

pub use build_server::BuildServer;
pub use supervisor::Supervisor;
