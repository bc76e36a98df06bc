// Client logic for driving the backend: orchestrated scans, browsing and the cart.

pub mod backend;
pub mod browse;
pub mod cart;
pub mod orchestrator;

pub use backend::{BackendClient, BackendConfig};
pub use cart::Cart;
pub use orchestrator::{ScanOrchestrator, ScanState};
