use crate::core::jitter::Jitterer;
use crate::core::{Catalog, CatalogSource};
use crate::utils::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Reads the catalog document from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_catalog(&self) -> Result<Catalog> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ScanError::CatalogLoadError {
                path: self.describe(),
                message: e.to_string(),
            })?;
        Catalog::from_json_str(&raw).map_err(|e| ScanError::CatalogLoadError {
            path: self.describe(),
            message: e.to_string(),
        })
    }
}

/// What a scan jitters from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPolicy {
    /// Always jitter the catalog as loaded at startup.
    #[default]
    Fresh,
    /// Jitter the previous scan's output, so drift compounds.
    Cumulative,
}

impl std::str::FromStr for SnapshotPolicy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fresh" => Ok(SnapshotPolicy::Fresh),
            "cumulative" => Ok(SnapshotPolicy::Cumulative),
            other => Err(ScanError::InvalidConfigValueError {
                field: "jitter.policy".to_string(),
                value: other.to_string(),
                reason: "expected 'fresh' or 'cumulative'".to_string(),
            }),
        }
    }
}

/// Holds the catalog loaded at startup. The snapshot itself is never
/// mutated; the cumulative policy keeps its running copy behind a lock.
#[derive(Debug)]
pub struct CatalogStore {
    snapshot: Arc<Catalog>,
    policy: SnapshotPolicy,
    current: Mutex<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog, policy: SnapshotPolicy) -> Self {
        let snapshot = Arc::new(catalog);
        Self {
            current: Mutex::new(Arc::clone(&snapshot)),
            snapshot,
            policy,
        }
    }

    /// Loads once from `source`. Failures are logged and leave the store
    /// holding an empty catalog.
    pub async fn load<S: CatalogSource>(source: &S, policy: SnapshotPolicy) -> Self {
        match source.read_catalog().await {
            Ok(catalog) => {
                tracing::info!(
                    "📦 Loaded catalog from {}: {} markets, {} products",
                    source.describe(),
                    catalog.markets().len(),
                    catalog.products().len()
                );
                for (product, market) in catalog.dangling_market_refs() {
                    tracing::warn!(
                        "Product {} references unknown market '{}'",
                        product,
                        market
                    );
                }
                Self::new(catalog, policy)
            }
            Err(e) => {
                tracing::error!("❌ {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                tracing::warn!("Serving an empty catalog");
                Self::new(Catalog::default(), policy)
            }
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.snapshot)
    }

    /// Produces the next scan result according to the store's policy.
    pub async fn next_scan(&self, jitterer: &Jitterer) -> Catalog {
        match self.policy {
            SnapshotPolicy::Fresh => jitterer.jitter(&self.snapshot),
            SnapshotPolicy::Cumulative => {
                let mut current = self.current.lock().await;
                let next = jitterer.jitter(&current);
                *current = Arc::new(next.clone());
                next
            }
        }
    }
}
