pub mod catalog;
pub mod engine;
pub mod jitter;
pub mod service;
pub mod stages;

pub use crate::domain::model::{CartItem, Catalog, Market, PriceEntry, Product, ProductId, StatusReport};
pub use crate::domain::ports::{CatalogSource, ScanContext, ScanStage};
pub use crate::utils::error::Result;
