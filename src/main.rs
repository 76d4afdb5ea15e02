//! SourceDrop -- device data-source settings and file & folder ingestion.
//!
//! Thin binary entry point. All logic lives in the `sourcedrop-core`
//! and `sourcedrop-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use sourcedrop_core::config::IngestConfig;
use sourcedrop_core::settings::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
use std::path::PathBuf;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "SOURCEDROP_CONFIG";

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("SourceDrop starting");

    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = IngestConfig::load_or_default(config_path.as_deref());

    let store: Box<dyn SettingsStore> = match &config.settings_dir {
        Some(dir) => {
            tracing::info!("Persisting settings under {}", dir.display());
            Box::new(JsonSettingsStore::new(dir))
        }
        None => {
            tracing::info!("No settings directory configured, settings are kept in memory");
            Box::new(MemorySettingsStore::new())
        }
    };
    tracing::info!("Device: {}", config.device_name);

    let icon = sourcedrop_gui::icon::generate_icon(64);

    // Load settings *before* opening the window so the first frame already
    // shows the data-source toggles.
    let state = sourcedrop_gui::SourceDropState::build(config, store);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("SourceDrop -- Device Settings")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_icon(icon)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "SourceDrop",
        options,
        Box::new(|cc| {
            Ok(Box::new(sourcedrop_gui::SourceDropApp::with_state(
                cc, state,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
