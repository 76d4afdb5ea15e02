/// Ingestion configuration, loaded from an optional JSON file.
///
/// Every field has a default so a partial (or missing) file is fine.
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Entries requested per paginated directory read.
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Files above this size keep their metadata but not their bytes.
pub const DEFAULT_MAX_CONTENT_BYTES: u64 = 8 * 1024 * 1024;

/// Settings-store key used when no device name is configured or detectable.
pub const FALLBACK_DEVICE_NAME: &str = "this-device";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestConfig {
    pub page_size: usize,
    /// Skip dot-files and OS metadata files while walking directories.
    pub skip_hidden: bool,
    pub read_contents: bool,
    pub max_content_bytes: u64,
    pub device_name: String,
    /// Directory for per-device settings files. In-memory store when unset.
    pub settings_dir: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            skip_hidden: true,
            read_contents: true,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
            device_name: default_device_name(),
            settings_dir: None,
        }
    }
}

impl IngestConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        // A zero page size would make every directory look empty.
        config.page_size = config.page_size.max(1);
        Ok(config)
    }

    /// Load from `path` if given, otherwise defaults. Load failures are
    /// logged and fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{e:#} -- using default config");
                Self::default()
            }
        }
    }
}

fn default_device_name() -> String {
    ["COMPUTERNAME", "HOSTNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| FALLBACK_DEVICE_NAME.to_string())
}
