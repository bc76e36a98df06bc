pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::ServerArgs;

pub use config::ServerConfig;
pub use crate::core::{catalog::CatalogStore, jitter::Jitterer, service::ScanService};
pub use utils::error::{Result, ScanError};
