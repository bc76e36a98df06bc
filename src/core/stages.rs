use crate::core::catalog::CatalogStore;
use crate::core::jitter::Jitterer;
use crate::core::{ScanContext, ScanStage};
use crate::utils::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Connect,
    Authenticate,
    Enumerate,
    Extract,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Connect => "connect",
            StageKind::Authenticate => "authenticate",
            StageKind::Enumerate => "enumerate",
            StageKind::Extract => "extract",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the configured stage list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub kind: StageKind,
    #[serde(default)]
    pub delay_ms: u64,
}

impl StageSpec {
    pub fn new(kind: StageKind, delay_ms: u64) -> Self {
        Self { kind, delay_ms }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// connect 2000 ms, authenticate 1500 ms, enumerate 1000 ms, then extract.
pub fn default_stages() -> Vec<StageSpec> {
    vec![
        StageSpec::new(StageKind::Connect, 2000),
        StageSpec::new(StageKind::Authenticate, 1500),
        StageSpec::new(StageKind::Enumerate, 1000),
        StageSpec::new(StageKind::Extract, 0),
    ]
}

/// `extract` must be present exactly once and be the final stage.
pub fn check_stage_order(stages: &[StageSpec]) -> Result<()> {
    let extracts = stages
        .iter()
        .filter(|s| s.kind == StageKind::Extract)
        .count();
    if extracts != 1 {
        return Err(ScanError::ConfigValidationError {
            field: "scan.stages".to_string(),
            message: format!("expected exactly one extract stage, found {}", extracts),
        });
    }
    if stages.last().map(|s| s.kind) != Some(StageKind::Extract) {
        return Err(ScanError::ConfigValidationError {
            field: "scan.stages".to_string(),
            message: "extract must be the last stage".to_string(),
        });
    }
    Ok(())
}

/// Simulated work: only consumes time.
pub struct DelayStage {
    kind: StageKind,
    delay: Duration,
}

impl DelayStage {
    pub fn new(kind: StageKind, delay: Duration) -> Self {
        Self { kind, delay }
    }
}

#[async_trait::async_trait]
impl ScanStage for DelayStage {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn run(&self, context: &mut ScanContext) -> Result<()> {
        tracing::debug!(scan_id = context.scan_id, "{} waiting {:?}", self.kind, self.delay);
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Final stage: produces the jittered catalog.
pub struct ExtractStage {
    store: Arc<CatalogStore>,
    jitterer: Jitterer,
    delay: Duration,
}

impl ExtractStage {
    pub fn new(store: Arc<CatalogStore>, jitterer: Jitterer, delay: Duration) -> Self {
        Self {
            store,
            jitterer,
            delay,
        }
    }
}

#[async_trait::async_trait]
impl ScanStage for ExtractStage {
    fn name(&self) -> &str {
        StageKind::Extract.as_str()
    }

    async fn run(&self, context: &mut ScanContext) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let catalog = self.store.next_scan(&self.jitterer).await;
        tracing::debug!(
            scan_id = context.scan_id,
            "extracted {} products",
            catalog.products().len()
        );
        context.catalog = Some(catalog);
        Ok(())
    }
}
