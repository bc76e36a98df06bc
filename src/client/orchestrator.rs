//! Client-side scan choreography.
//!
//! Drives `idle -> scanning -> success | error`: probe `/api/status`, play the
//! scripted progress lines, fetch `/api/scan`, then hand the new catalog to
//! the caller. The script is presentation only and does not affect the
//! backend contract.

use crate::client::backend::BackendClient;
use crate::core::Catalog;
use crate::utils::error::{Result, ScanError};
use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Scanning,
    Success,
    Error,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "scanning",
            ScanState::Success => "success",
            ScanState::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub time: String,
    pub message: String,
    pub kind: LogKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub message: String,
    pub delay: Duration,
    pub progress: u8,
}

impl ScriptStep {
    pub fn new(message: &str, delay_ms: u64, progress: u8) -> Self {
        Self {
            message: message.to_string(),
            delay: Duration::from_millis(delay_ms),
            progress,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub script: Vec<ScriptStep>,
    /// Pause between reaching `success` and delivering the catalog.
    pub settle_delay: Duration,
}

impl OrchestratorConfig {
    /// Same script with no pauses.
    pub fn instant() -> Self {
        let mut config = Self::default();
        for step in &mut config.script {
            step.delay = Duration::ZERO;
        }
        config.settle_delay = Duration::ZERO;
        config
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            script: vec![
                ScriptStep::new("🔐 Building proxy pool...", 800, 20),
                ScriptStep::new("🌍 Esenlik -> connection established", 1200, 35),
                ScriptStep::new("🌍 Migros -> cookie wall bypassed", 1000, 50),
                ScriptStep::new("🕷️ Crawling product catalog...", 1500, 70),
                ScriptStep::new("💰 Extracting price data...", 1000, 85),
            ],
            settle_delay: Duration::from_millis(1000),
        }
    }
}

pub struct ScanOrchestrator {
    backend: BackendClient,
    config: OrchestratorConfig,
    state: ScanState,
    logs: Vec<LogEntry>,
    progress: u8,
}

impl ScanOrchestrator {
    pub fn new(backend: BackendClient, config: OrchestratorConfig) -> Self {
        Self {
            backend,
            config,
            state: ScanState::Idle,
            logs: Vec::new(),
            progress: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Retry is only offered from `error`.
    pub fn can_retry(&self) -> bool {
        self.state == ScanState::Error
    }

    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
        self.logs.clear();
        self.progress = 0;
    }

    fn log(&mut self, message: impl Into<String>, kind: LogKind) {
        let entry = LogEntry {
            time: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            kind,
        };
        match kind {
            LogKind::Error => tracing::error!("{}", entry.message),
            LogKind::Warning => tracing::warn!("{}", entry.message),
            _ => tracing::info!("{}", entry.message),
        }
        self.logs.push(entry);
    }

    /// Runs one scan cycle. `on_update` receives the new catalog after the
    /// settle delay. Allowed from `idle` and `error` only.
    ///
    /// Backend failures end in `error` and are returned as `Ok(ScanState::Error)`;
    /// the `Err` side is reserved for invalid transitions.
    pub async fn start_scan<F>(&mut self, on_update: F) -> Result<ScanState>
    where
        F: FnOnce(Catalog),
    {
        if !matches!(self.state, ScanState::Idle | ScanState::Error) {
            return Err(ScanError::InvalidTransition {
                state: self.state.to_string(),
            });
        }

        self.state = ScanState::Scanning;
        self.logs.clear();
        self.progress = 0;
        self.log("🚀 SYSTEM STARTING...", LogKind::System);

        self.log("📡 Checking backend server...", LogKind::Info);
        if let Err(e) = self.backend.status().await {
            tracing::debug!("status probe failed: {}", e);
            self.log(
                format!(
                    "❌ CRITICAL: backend at {} is not responding!",
                    self.backend.endpoint("/")
                ),
                LogKind::Error,
            );
            self.log("⚠️ Make sure the server is running.", LogKind::Warning);
            self.state = ScanState::Error;
            return Ok(self.state);
        }

        self.log("✅ Backend connection established.", LogKind::Success);
        self.progress = 10;

        let script = self.config.script.clone();
        for step in script {
            tokio::time::sleep(step.delay).await;
            self.log(step.message, LogKind::Info);
            self.progress = step.progress;
        }

        self.log("📥 Fetching API data...", LogKind::System);
        match self.backend.scan().await {
            Ok(catalog) => {
                self.progress = 100;
                self.log("💾 Data stored.", LogKind::Success);
                self.log("✨ SCAN COMPLETED SUCCESSFULLY.", LogKind::System);
                self.state = ScanState::Success;

                tokio::time::sleep(self.config.settle_delay).await;
                on_update(catalog);
                Ok(self.state)
            }
            Err(e) => {
                self.log(format!("💥 SCAN ERROR: {}", e), LogKind::Error);
                self.state = ScanState::Error;
                Ok(self.state)
            }
        }
    }
}
