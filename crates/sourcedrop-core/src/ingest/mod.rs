/// Ingestion pipeline: walk dropped inputs, normalise paths, build the
/// forest, dedup against the Selection and hand it to the analyzer.
pub mod builder;
pub mod normalize;
pub mod session;
pub mod walker;

pub use builder::{build_forest, TreeBuilder};
pub use session::{
    prepare_batch, IngestProgress, IngestionSession, PreparedBatch, SessionPhase, SubmissionItem,
};
pub use walker::{
    walk_directory, DirectoryEntry, DirectoryHandle, FsDirectory, MemoryDirectory, WalkOutcome,
    WalkWarning,
};
