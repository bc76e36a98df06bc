use crate::config::toml_config::ServerConfig;
use crate::core::catalog::SnapshotPolicy;
use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "grocery-scan")]
#[command(about = "Serves the market catalog with simulated freshly scraped prices")]
pub struct ServerArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Catalog JSON document loaded at startup
    #[arg(long)]
    pub catalog: Option<String>,

    #[arg(long)]
    pub jitter_low: Option<f64>,

    #[arg(long)]
    pub jitter_high: Option<f64>,

    /// fresh | cumulative
    #[arg(long)]
    pub policy: Option<SnapshotPolicy>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

pub const DEFAULT_CONFIG_FILE: &str = "grocery-scan.toml";

impl ServerArgs {
    /// File given by `--config`, else `grocery-scan.toml` when it exists,
    /// else built-in defaults. Flags are applied on top.
    pub fn load_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                ServerConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => ServerConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(catalog) = &self.catalog {
            config.catalog.path = catalog.clone();
        }
        if let Some(low) = self.jitter_low {
            config.jitter.low = low;
        }
        if let Some(high) = self.jitter_high {
            config.jitter.high = high;
        }
        if let Some(policy) = self.policy {
            config.jitter.policy = policy;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.log_json {
            config.logging.json = true;
        }
    }
}
