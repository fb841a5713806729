//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default analysis timeout in seconds; configured values clamp to 5–30 s.
const DEFAULT_TIMEOUT_S: u64 = 10;
const MIN_TIMEOUT_S: u64 = 5;
const MAX_TIMEOUT_S: u64 = 30;

/// Paths to all Insight data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Snapshot database directory (`data/snapshot/`).
    pub snapshot: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            snapshot: root.join("snapshot"),
            root,
        };
        std::fs::create_dir_all(&paths.snapshot)?;
        Ok(paths)
    }
}

/// Top-level Insight configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Analysis backend endpoint (`POST {backend_url}` with `{"text": ...}`).
    pub backend_url: String,
    /// Bound on one analysis dispatch, clamped to 5–30 s.
    pub analysis_timeout: Duration,
}

impl InsightConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let backend_url = std::env::var("INSIGHT_BACKEND_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}/analyze", port));

        let timeout_s = std::env::var("INSIGHT_ANALYSIS_TIMEOUT_S")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_S)
            .clamp(MIN_TIMEOUT_S, MAX_TIMEOUT_S);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            backend_url,
            analysis_timeout: Duration::from_secs(timeout_s),
        })
    }
}
