/// Settings persistence, keyed by device name.
///
/// Stores keep the raw JSON and run it through
/// [`DeviceSettings::merged_with_defaults`] on the way out, so records
/// written by older builds (missing or extra keys) still load.
use super::DeviceSettings;
use crate::error::{IngestError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub trait SettingsStore: Send + Sync {
    /// Settings for `device`, or the defaults if none were ever saved.
    fn get_device_settings(&self, device: &str) -> Result<DeviceSettings>;

    fn save_device_settings(&self, device: &str, settings: &DeviceSettings) -> Result<()>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemorySettingsStore {
    records: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_device_settings(&self, device: &str) -> Result<DeviceSettings> {
        let records = self.records.read();
        Ok(records
            .get(device)
            .map(DeviceSettings::merged_with_defaults)
            .unwrap_or_default())
    }

    fn save_device_settings(&self, device: &str, settings: &DeviceSettings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        self.records.write().insert(device.to_string(), value);
        Ok(())
    }
}

/// On-disk record: one JSON file per device.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRecord {
    device_name: String,
    settings: serde_json::Value,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// Store backed by `<dir>/<device>.json` files.
pub struct JsonSettingsStore {
    dir: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, device: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(device)))
    }
}

/// Filesystem-safe, reversible file stem for a device name.
///
/// ASCII letters, digits and `-` are kept; every other UTF-8 byte
/// (including `_`) becomes `_XX` in hex, so distinct names never share a
/// file.
fn file_stem(device: &str) -> String {
    let mut stem = String::with_capacity(device.len());
    for byte in device.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{byte:02X}"));
        }
    }
    stem
}

impl SettingsStore for JsonSettingsStore {
    fn get_device_settings(&self, device: &str) -> Result<DeviceSettings> {
        let path = self.record_path(device);
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings found for {device}, using defaults");
                return Ok(DeviceSettings::default());
            }
            Err(e) => {
                return Err(IngestError::PersistenceFailure(format!(
                    "reading {}: {e}",
                    path.display()
                )))
            }
        };
        let record: DeviceRecord = serde_json::from_str(&text).map_err(|e| {
            IngestError::PersistenceFailure(format!("parsing {}: {e}", path.display()))
        })?;
        debug!("Loaded settings for {} from {}", record.device_name, path.display());
        Ok(DeviceSettings::merged_with_defaults(&record.settings))
    }

    fn save_device_settings(&self, device: &str, settings: &DeviceSettings) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let record = DeviceRecord {
            device_name: device.to_string(),
            settings: serde_json::to_value(settings)?,
            updated_at: chrono::Utc::now(),
        };
        let path = self.record_path(device);
        std::fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        debug!("Saved settings for {device} to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FILES_AND_FOLDERS;

    #[test]
    fn test_memory_store_roundtrip_per_device() {
        let store = MemorySettingsStore::new();
        let mut settings = store.get_device_settings("laptop").unwrap();
        assert_eq!(settings, DeviceSettings::default());

        settings.toggle(FILES_AND_FOLDERS);
        store.save_device_settings("laptop", &settings).unwrap();

        assert!(store
            .get_device_settings("laptop")
            .unwrap()
            .files_and_folders_visible());
        assert!(!store
            .get_device_settings("desktop")
            .unwrap()
            .files_and_folders_visible());
    }

    #[test]
    fn test_json_store_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(tmp.path().join("settings"));

        assert_eq!(
            store.get_device_settings("my pc/1").unwrap(),
            DeviceSettings::default()
        );

        let mut settings = DeviceSettings::default();
        settings.toggle("camera");
        store.save_device_settings("my pc/1", &settings).unwrap();

        assert!(tmp.path().join("settings/my_20pc_2F1.json").exists());
        let loaded = store.get_device_settings("my pc/1").unwrap();
        assert_eq!(loaded.enabled_sections(), vec!["camera"]);
    }

    #[test]
    fn test_json_store_keeps_similar_names_apart() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(tmp.path());

        let mut settings = DeviceSettings::default();
        settings.toggle("camera");
        store.save_device_settings("my pc/1", &settings).unwrap();

        assert_eq!(
            store.get_device_settings("my_pc_1").unwrap(),
            DeviceSettings::default()
        );
        assert_ne!(file_stem("my pc/1"), file_stem("my_pc_1"));
        assert_eq!(file_stem("DESK-01"), "DESK-01");
    }

    #[test]
    fn test_json_store_corrupt_file_is_persistence_failure() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("dev.json"), "{ not json").unwrap();
        let store = JsonSettingsStore::new(tmp.path());
        assert!(matches!(
            store.get_device_settings("dev"),
            Err(IngestError::PersistenceFailure(_))
        ));
    }
}
