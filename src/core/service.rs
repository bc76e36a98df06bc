use crate::core::catalog::CatalogStore;
use crate::core::engine::ScanEngine;
use crate::core::jitter::Jitterer;
use crate::core::stages::{check_stage_order, DelayStage, ExtractStage, StageKind, StageSpec};
use crate::core::{Catalog, ScanContext, ScanStage};
use crate::utils::error::{Result, ScanError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-process scan entry point shared by all request handlers.
#[derive(Debug)]
pub struct ScanService {
    store: Arc<CatalogStore>,
    jitterer: Jitterer,
    stages: Vec<StageSpec>,
    next_scan_id: AtomicU64,
}

impl ScanService {
    pub fn new(store: Arc<CatalogStore>, jitterer: Jitterer, stages: Vec<StageSpec>) -> Result<Self> {
        check_stage_order(&stages)?;
        Ok(Self {
            store,
            jitterer,
            stages,
            next_scan_id: AtomicU64::new(1),
        })
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn build_engine(&self) -> ScanEngine {
        let stages = self
            .stages
            .iter()
            .map(|spec| -> Box<dyn ScanStage> {
                match spec.kind {
                    StageKind::Extract => Box::new(ExtractStage::new(
                        Arc::clone(&self.store),
                        self.jitterer.clone(),
                        spec.delay(),
                    )),
                    kind => Box::new(DelayStage::new(kind, spec.delay())),
                }
            })
            .collect();
        ScanEngine::new(stages)
    }

    /// Runs one scan on its own task, so it completes even when the caller
    /// stops waiting.
    pub async fn scan(&self) -> Result<Catalog> {
        let scan_id = self.next_scan_id.fetch_add(1, Ordering::Relaxed);
        let engine = self.build_engine();
        let handle = tokio::spawn(async move { engine.run(ScanContext::new(scan_id)).await });

        match handle.await {
            Ok(Ok((catalog, _context))) => Ok(catalog),
            Ok(Err(e)) => Err(e),
            Err(join_error) => Err(ScanError::ProcessingError {
                message: format!("scan task {} aborted: {}", scan_id, join_error),
            }),
        }
    }
}
