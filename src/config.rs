//! Runtime configuration, gathered from CLI flags and the environment.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::provider::{DataConfig, SnapshotProvider};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Where the marketplace data comes from.
#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// Remote backend base URL (serves /vehicles, /dealers, /proposals).
    #[arg(long = "backend", env = "AUTOPROPOSTA_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Snapshot file. Defaults to ~/.autoproposta/snapshot.json.
    #[arg(long, env = "AUTOPROPOSTA_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Offline mode: only use the snapshot and built-in data.
    #[arg(long)]
    pub offline: bool,

    /// Backend request timeout in seconds.
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

impl DataArgs {
    pub fn to_data_config(&self) -> DataConfig {
        DataConfig {
            backend_url: self
                .backend_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            snapshot_path: self.snapshot.clone().unwrap_or_else(SnapshotProvider::default_path),
            offline: self.offline,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "AUTOPROPOSTA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on.
    #[arg(long, short = 'p', env = "AUTOPROPOSTA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[command(flatten)]
    pub data: DataArgs,
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data: DataConfig,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data: DataConfig::default(),
        }
    }
}

impl From<&ServeArgs> for Config {
    fn from(args: &ServeArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            data: args.data.to_data_config(),
        }
    }
}
