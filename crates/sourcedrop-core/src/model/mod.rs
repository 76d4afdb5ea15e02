/// Data model for ingestion: raw descriptors in, canonical tree nodes out.
pub mod descriptor;
pub mod size;
pub mod tree_node;

pub use descriptor::RawFileDescriptor;
pub use tree_node::{ItemDetails, NodeKind, TreeNode};

/// Root-level nodes handed to the analyzer, each path unique.
pub type IngestionBatch = Vec<TreeNode>;
