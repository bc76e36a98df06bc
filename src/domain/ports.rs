use crate::domain::model::Catalog;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};

pub trait CatalogSource: Send + Sync {
    /// Human-readable origin, used in log lines and load errors.
    fn describe(&self) -> String;
    fn read_catalog(&self) -> impl std::future::Future<Output = Result<Catalog>> + Send;
}

/// State threaded through one scan. Each request gets its own.
#[derive(Debug)]
pub struct ScanContext {
    pub scan_id: u64,
    pub started_at: Instant,
    pub catalog: Option<Catalog>,
    pub timings: Vec<(String, Duration)>,
}

impl ScanContext {
    pub fn new(scan_id: u64) -> Self {
        Self {
            scan_id,
            started_at: Instant::now(),
            catalog: None,
            timings: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[async_trait]
pub trait ScanStage: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, context: &mut ScanContext) -> Result<()>;
}
