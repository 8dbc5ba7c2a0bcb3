pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod metrics_server;
pub mod observability;
pub mod store;
pub mod upstream;
pub mod validation;

pub use cache::{CacheFill, RefreshPolicy};
pub use error::EnergyError;
