use crate::core::{Catalog, ScanContext, ScanStage};
use crate::utils::error::{Result, ScanError};
use std::time::Instant;

/// Runs a fixed list of stages in order.
pub struct ScanEngine {
    stages: Vec<Box<dyn ScanStage>>,
}

impl ScanEngine {
    pub fn new(stages: Vec<Box<dyn ScanStage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, mut context: ScanContext) -> Result<(Catalog, ScanContext)> {
        tracing::info!(scan_id = context.scan_id, "🕷️ New scan request received");

        for stage in &self.stages {
            tracing::info!(scan_id = context.scan_id, "   ↳ {}...", stage.name());
            let started = Instant::now();
            stage.run(&mut context).await?;
            context
                .timings
                .push((stage.name().to_string(), started.elapsed()));
        }

        let catalog = context
            .catalog
            .take()
            .ok_or_else(|| ScanError::ProcessingError {
                message: "no stage produced a catalog".to_string(),
            })?;

        tracing::info!(
            scan_id = context.scan_id,
            "   ↳ ✅ Scan finished in {}ms",
            context.elapsed().as_millis()
        );
        Ok((catalog, context))
    }
}
