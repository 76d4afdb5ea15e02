/// SourceDrop Core -- ingestion, analysis, and device settings.
///
/// This crate contains all business logic with zero UI dependencies.
/// The GUI crate drives it through [`ingest::IngestionSession`] and a
/// [`settings::SettingsStore`].
///
/// # Modules
///
/// - [`model`] -- Raw file descriptors and the hierarchical tree nodes.
/// - [`ingest`] -- Directory walking, tree building and the ingestion session.
/// - [`analysis`] -- The analyzer seam and the in-process item-details analyzer.
/// - [`settings`] -- Per-device data-source toggles and their stores.
/// - [`config`] -- Runtime configuration loaded from JSON.
/// - [`error`] -- Error kinds shared by the pipeline.
pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod settings;

pub use error::{IngestError, Result};
