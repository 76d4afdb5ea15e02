/// Application state management.
///
/// Centralises all mutable state that the UI reads and writes. The
/// ingestion thread communicates via the session's channel; state updates
/// happen in `process_messages()` which runs once per frame.
///
/// Raw window input (hovered files, dropped files, focus changes, picker
/// results) reaches this module as discrete [`DropZoneEvent`]s, so every
/// drop-zone transition is an explicit method call that tests can drive
/// without a window.
use sourcedrop_core::analysis::{Analyzer, LocalAnalyzer};
use sourcedrop_core::config::IngestConfig;
use sourcedrop_core::error::IngestError;
use sourcedrop_core::ingest::{IngestionSession, SubmissionItem};
use sourcedrop_core::model::TreeNode;
use sourcedrop_core::settings::{DeviceSettings, SettingsStore, FILES_AND_FOLDERS};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drop-zone text while files are dragged over the window.
pub const DRAG_ACTIVE_TEXT: &str = "Drop the files here ...";
/// Drop-zone text while the file picker is open.
pub const PICKER_ACTIVE_TEXT: &str = "Add files from device ...";
/// Drop-zone text when nothing is armed.
pub const IDLE_PROMPT_TEXT: &str = "Drag 'n' drop some files here\nor\nClick to select files";

/// Discrete inputs that drive the drop zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropZoneEvent {
    DragEnter,
    DragLeave,
    /// Files or directories were dropped on the window.
    Drop(Vec<PathBuf>),
    PickerOpened,
    /// The picker closed. Empty when the user cancelled.
    PickerClosed(Vec<PathBuf>),
    /// The window got focus back. Clears any stale armed state.
    FocusRegained,
}

/// Visual armed state of the drop zone. Never affects an in-flight round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropZone {
    pub drag_active: bool,
    pub picker_active: bool,
}

impl DropZone {
    pub fn is_armed(&self) -> bool {
        self.drag_active || self.picker_active
    }

    pub fn text(&self) -> &'static str {
        if self.drag_active {
            DRAG_ACTIVE_TEXT
        } else if self.picker_active {
            PICKER_ACTIVE_TEXT
        } else {
            IDLE_PROMPT_TEXT
        }
    }

    fn disarm(&mut self) {
        self.drag_active = false;
        self.picker_active = false;
    }
}

/// All application state.
pub struct AppState {
    // ── Device settings ────────────────────────────────
    pub device_name: String,
    store: Box<dyn SettingsStore>,
    /// `None` until `load_settings` succeeds.
    pub settings: Option<DeviceSettings>,
    /// Key of the section tab currently shown.
    pub active_tab: Option<&'static str>,

    // ── Ingestion ──────────────────────────────────────
    pub session: IngestionSession,
    pub drop_zone: DropZone,
    /// Paths that could not even be described (e.g. deleted before the drop).
    pub skipped_paths: Vec<String>,

    // ── UI state ───────────────────────────────────────
    /// Last user-visible error, from any source.
    pub error: Option<String>,
    pub show_about: bool,
}

impl AppState {
    /// Create state with the in-process analyzer. Settings are not loaded yet.
    pub fn new(config: IngestConfig, store: Box<dyn SettingsStore>) -> Self {
        Self::with_analyzer(config, store, Arc::new(LocalAnalyzer))
    }

    pub fn with_analyzer(
        config: IngestConfig,
        store: Box<dyn SettingsStore>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            device_name: config.device_name.clone(),
            store,
            settings: None,
            active_tab: None,
            session: IngestionSession::new(config, analyzer),
            drop_zone: DropZone::default(),
            skipped_paths: Vec::new(),
            error: None,
            show_about: false,
        }
    }

    // ── Settings ───────────────────────────────────────

    /// Fetch this device's settings from the store.
    ///
    /// On failure the settings stay unloaded and the error is recorded.
    pub fn load_settings(&mut self) -> bool {
        match self.store.get_device_settings(&self.device_name) {
            Ok(settings) => {
                info!(
                    "Loaded settings for {}: {} section(s) enabled",
                    self.device_name,
                    settings.enabled_sections().len()
                );
                self.settings = Some(settings);
                self.sync_active_tab();
                true
            }
            Err(err) => {
                warn!("Failed to load settings for {}: {err}", self.device_name);
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub fn settings_loaded(&self) -> bool {
        self.settings.is_some()
    }

    /// Flip one setting and persist the result.
    ///
    /// Returns the new state, or `Ok(None)` for a key outside the catalog.
    /// The toggle stays applied in memory even if saving fails.
    pub fn toggle_setting(&mut self, key: &str) -> Result<Option<bool>, IngestError> {
        let settings = self.settings.as_mut().ok_or(IngestError::SettingsNotLoaded)?;
        let Some(enabled) = settings.toggle(key) else {
            warn!("Ignoring toggle of unknown setting {key}");
            return Ok(None);
        };
        debug!("Setting {key} is now {}", if enabled { "on" } else { "off" });

        let result = self.store.save_device_settings(&self.device_name, settings);
        self.sync_active_tab();
        match result {
            Ok(()) => {
                self.error = None;
                Ok(Some(enabled))
            }
            Err(err) => {
                warn!("Failed to save settings: {err}");
                self.error = Some(format!("Failed to save settings: {err}"));
                Err(err)
            }
        }
    }

    /// Enabled section keys, in catalog order.
    pub fn visible_tabs(&self) -> Vec<&'static str> {
        self.settings
            .as_ref()
            .map(DeviceSettings::enabled_sections)
            .unwrap_or_default()
    }

    /// Switch tabs. Ignored for sections that are not enabled.
    pub fn select_tab(&mut self, key: &str) -> bool {
        match self.visible_tabs().into_iter().find(|k| *k == key) {
            Some(tab) => {
                self.active_tab = Some(tab);
                true
            }
            None => false,
        }
    }

    pub fn files_and_folders_visible(&self) -> bool {
        self.settings
            .as_ref()
            .is_some_and(DeviceSettings::files_and_folders_visible)
    }

    /// Keep the active tab on an enabled section.
    fn sync_active_tab(&mut self) {
        let tabs = self.visible_tabs();
        let still_visible = self.active_tab.is_some_and(|t| tabs.contains(&t));
        if !still_visible {
            self.active_tab = tabs.first().copied();
        }
    }

    // ── Drop zone ──────────────────────────────────────

    /// Apply one drop-zone input.
    ///
    /// `Drop` and `PickerClosed` submit their paths; the other events only
    /// change the armed state.
    pub fn handle_drop_zone_event(&mut self, event: DropZoneEvent) -> Result<(), IngestError> {
        match event {
            DropZoneEvent::DragEnter => {
                self.drop_zone.drag_active = true;
                Ok(())
            }
            DropZoneEvent::DragLeave => {
                self.drop_zone.drag_active = false;
                Ok(())
            }
            DropZoneEvent::PickerOpened => {
                self.drop_zone.picker_active = true;
                Ok(())
            }
            DropZoneEvent::FocusRegained => {
                self.drop_zone.disarm();
                Ok(())
            }
            DropZoneEvent::Drop(paths) => {
                self.drop_zone.disarm();
                self.submit_paths(paths)
            }
            DropZoneEvent::PickerClosed(paths) => {
                self.drop_zone.disarm();
                if paths.is_empty() {
                    debug!("File picker cancelled");
                    return Ok(());
                }
                self.submit_paths(paths)
            }
        }
    }

    /// Describe `paths` and start an ingestion round.
    ///
    /// Paths that no longer exist are skipped with a warning. Rejected with
    /// `SessionBusy` while a round is running.
    pub fn submit_paths(&mut self, paths: Vec<PathBuf>) -> Result<(), IngestError> {
        self.skipped_paths.clear();
        let config = self.session.config().clone();
        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            match SubmissionItem::from_path(&path, &config) {
                Ok(item) => items.push(item),
                Err(err) => {
                    warn!("Skipping {}: {err}", path.display());
                    self.skipped_paths.push(path.display().to_string());
                }
            }
        }
        if items.is_empty() {
            debug!("Nothing to ingest");
            return Ok(());
        }

        match self.session.submit(items) {
            Ok(()) => {
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Remove the Selection entry at `index` (as listed in the UI).
    pub fn remove_entry(&mut self, index: usize) -> Option<TreeNode> {
        let removed = self.session.remove_at(index);
        if let Some(node) = &removed {
            info!("Removed {} from selection", node.path);
        }
        removed
    }

    pub fn selection(&self) -> &[TreeNode] {
        self.session.selection()
    }

    pub fn is_ingesting(&self) -> bool {
        self.session.is_ingesting()
    }

    /// Drain pending ingestion messages. Called once per frame.
    ///
    /// Returns `true` if the UI should repaint.
    pub fn process_messages(&mut self) -> bool {
        let was_ingesting = self.session.is_ingesting();
        let changed = self.session.process_messages();
        if was_ingesting && !self.session.is_ingesting() {
            self.error = self.session.last_error().map(ToString::to_string);
        }
        changed
    }

    /// Whether the drop zone should be shown at all.
    pub fn drop_zone_visible(&self) -> bool {
        self.files_and_folders_visible() && self.active_tab == Some(FILES_AND_FOLDERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcedrop_core::settings::MemorySettingsStore;

    fn state() -> AppState {
        AppState::new(IngestConfig::default(), Box::new(MemorySettingsStore::new()))
    }

    #[test]
    fn test_drop_zone_text_per_state() {
        let mut zone = DropZone::default();
        assert_eq!(zone.text(), IDLE_PROMPT_TEXT);
        zone.picker_active = true;
        assert_eq!(zone.text(), PICKER_ACTIVE_TEXT);
        zone.drag_active = true;
        assert_eq!(zone.text(), DRAG_ACTIVE_TEXT);
    }

    #[test]
    fn test_focus_regained_disarms() {
        let mut s = state();
        s.handle_drop_zone_event(DropZoneEvent::DragEnter).unwrap();
        s.handle_drop_zone_event(DropZoneEvent::PickerOpened).unwrap();
        assert!(s.drop_zone.is_armed());
        s.handle_drop_zone_event(DropZoneEvent::FocusRegained).unwrap();
        assert_eq!(s.drop_zone, DropZone::default());
    }

    #[test]
    fn test_cancelled_picker_submits_nothing() {
        let mut s = state();
        s.handle_drop_zone_event(DropZoneEvent::PickerOpened).unwrap();
        s.handle_drop_zone_event(DropZoneEvent::PickerClosed(Vec::new()))
            .unwrap();
        assert!(!s.drop_zone.is_armed());
        assert!(!s.is_ingesting());
    }

    #[test]
    fn test_toggle_before_load_is_rejected() {
        let mut s = state();
        assert_eq!(
            s.toggle_setting(FILES_AND_FOLDERS),
            Err(IngestError::SettingsNotLoaded)
        );
    }

    #[test]
    fn test_active_tab_follows_enabled_sections() {
        let mut s = state();
        assert!(s.load_settings());
        assert_eq!(s.active_tab, None);

        s.toggle_setting("mic").unwrap();
        assert_eq!(s.active_tab, Some("mic"));
        s.toggle_setting(FILES_AND_FOLDERS).unwrap();
        assert_eq!(s.visible_tabs(), vec![FILES_AND_FOLDERS, "mic"]);
        assert_eq!(s.active_tab, Some("mic"));

        assert!(s.select_tab(FILES_AND_FOLDERS));
        assert!(s.drop_zone_visible());
        assert!(!s.select_tab("camera"));

        s.toggle_setting(FILES_AND_FOLDERS).unwrap();
        assert_eq!(s.active_tab, Some("mic"));
        assert!(!s.drop_zone_visible());
    }

    #[test]
    fn test_unknown_setting_is_ignored() {
        let mut s = state();
        s.load_settings();
        assert_eq!(s.toggle_setting("teleporter"), Ok(None));
    }
}
