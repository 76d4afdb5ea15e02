/// Per-device data-source settings.
///
/// Each setting is a toggle with a description. Enabled settings decide
/// which sections (tabs) are shown; the "files and folders" section is the
/// one that carries the ingestion drop zone.
pub mod store;

pub use store::{JsonSettingsStore, MemorySettingsStore, SettingsStore};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Key of the section that hosts file & folder ingestion.
pub const FILES_AND_FOLDERS: &str = "files_and_folders";

/// Known settings in display order, with their descriptions.
pub const CATALOG: &[(&str, &str)] = &[
    (
        FILES_AND_FOLDERS,
        "Learns from the files and folders you choose to add.",
    ),
    (
        "screen",
        "Records screen activity and learns what you do based on your screen activity.",
    ),
    (
        "session",
        "Captures what apps and sites you have open in any session. Learns how your sessions evolve over time.",
    ),
    (
        "processes",
        "Captures what background processes are running to determine what functionality you rely on while you compute.",
    ),
    (
        "keyboard",
        "Learns your typing patterns and keyboard shortcuts to better learn how you communicate and what functionality you rely on.",
    ),
    (
        "mouse",
        "Captures your mouse movements and clicks to learn how you interact with your computer.",
    ),
    (
        "camera",
        "Sees how you react while using your devices to determine what events trigger what emotions and behaviors.",
    ),
    (
        "mic",
        "Listens to you while you're on calls and comments you might have while using your device in order to better understand you.",
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingItem {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
}

/// Settings for one device. Keys are always a subset of [`CATALOG`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSettings(BTreeMap<String, SettingItem>);

impl Default for DeviceSettings {
    /// Every catalog entry, disabled.
    fn default() -> Self {
        Self(
            CATALOG
                .iter()
                .map(|(key, description)| {
                    (
                        key.to_string(),
                        SettingItem {
                            enabled: false,
                            description: description.to_string(),
                        },
                    )
                })
                .collect(),
        )
    }
}

impl DeviceSettings {
    /// Overlay fetched settings on the defaults. Unknown keys are logged
    /// and dropped; malformed entries are skipped.
    pub fn merged_with_defaults(fetched: &serde_json::Value) -> Self {
        let mut merged = Self::default();
        let Some(obj) = fetched.as_object() else {
            if !fetched.is_null() {
                warn!("Ignoring settings that are not an object: {fetched}");
            }
            return merged;
        };
        for (key, value) in obj {
            if !merged.0.contains_key(key) {
                warn!("Unknown setting: {key}");
                continue;
            }
            let Some(item) = value.as_object() else {
                warn!("Setting {key} is not an object, keeping default");
                continue;
            };
            let enabled = item.get("enabled").and_then(|e| e.as_bool()).unwrap_or(false);
            let description = item
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("")
                .to_string();
            merged.0.insert(key.clone(), SettingItem { enabled, description });
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&SettingItem> {
        self.0.get(key)
    }

    /// Set a setting explicitly. Returns `false` for keys outside the catalog.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.entry_for(key) {
            Some(item) => {
                item.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Flip a setting and return its new state.
    ///
    /// A catalog key missing from this map is first default-initialised
    /// (disabled), so the first toggle enables it. Keys outside the catalog
    /// return `None`.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let item = self.entry_for(key)?;
        item.enabled = !item.enabled;
        Some(item.enabled)
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SettingItem)> + '_ {
        CATALOG
            .iter()
            .filter_map(|(key, _)| self.0.get(*key).map(|item| (*key, item)))
    }

    /// Keys of enabled settings, in catalog order. These are the visible tabs.
    pub fn enabled_sections(&self) -> Vec<&'static str> {
        self.iter()
            .filter(|(_, item)| item.enabled)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn files_and_folders_visible(&self) -> bool {
        self.get(FILES_AND_FOLDERS).is_some_and(|item| item.enabled)
    }

    fn entry_for(&mut self, key: &str) -> Option<&mut SettingItem> {
        let (catalog_key, description) = CATALOG.iter().find(|(k, _)| *k == key)?;
        Some(
            self.0
                .entry(catalog_key.to_string())
                .or_insert_with(|| SettingItem {
                    enabled: false,
                    description: description.to_string(),
                }),
        )
    }
}

/// Words kept lower-case in section titles unless they come first.
const MINOR_WORDS: &[&str] = &[
    "and", "of", "with", "for", "the", "in", "a", "to", "on", "at", "by", "an", "as", "but", "or",
    "nor", "so", "yet",
];

/// Title for a setting key, e.g. `files_and_folders` -> `Files and Folders`.
pub fn format_setting_name(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                return lower;
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_cover_catalog_disabled() {
        let settings = DeviceSettings::default();
        assert_eq!(settings.iter().count(), CATALOG.len());
        assert!(settings.enabled_sections().is_empty());
        assert!(!settings.files_and_folders_visible());
    }

    #[test]
    fn test_merge_overlays_and_drops_unknown() {
        let fetched = json!({
            "files_and_folders": { "enabled": true, "description": "custom" },
            "mic": { "enabled": "yes" },
            "teleporter": { "enabled": true },
            "camera": 3
        });
        let settings = DeviceSettings::merged_with_defaults(&fetched);
        assert!(settings.files_and_folders_visible());
        assert_eq!(settings.get(FILES_AND_FOLDERS).unwrap().description, "custom");
        assert!(!settings.get("mic").unwrap().enabled);
        assert!(settings.get("teleporter").is_none());
        assert!(!settings.get("camera").unwrap().description.is_empty());
    }

    #[test]
    fn test_toggle_and_sections_order() {
        let mut settings = DeviceSettings::default();
        assert_eq!(settings.toggle("mic"), Some(true));
        assert_eq!(settings.toggle(FILES_AND_FOLDERS), Some(true));
        assert_eq!(settings.enabled_sections(), vec![FILES_AND_FOLDERS, "mic"]);
        assert_eq!(settings.toggle("mic"), Some(false));
        assert_eq!(settings.toggle("teleporter"), None);
    }

    #[test]
    fn test_toggle_default_initialises_missing_key() {
        let mut settings = DeviceSettings(BTreeMap::new());
        assert_eq!(settings.toggle("screen"), Some(true));
        assert!(!settings.get("screen").unwrap().description.is_empty());
    }

    #[test]
    fn test_format_setting_name() {
        assert_eq!(format_setting_name("files_and_folders"), "Files and Folders");
        assert_eq!(format_setting_name("mic"), "Mic");
        assert_eq!(format_setting_name("the_end_of_days"), "The End of Days");
    }

    #[test]
    fn test_serialises_as_plain_map() {
        let value = serde_json::to_value(DeviceSettings::default()).unwrap();
        assert_eq!(value["screen"]["enabled"], json!(false));
    }
}
