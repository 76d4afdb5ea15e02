/// Tree builder: folds normalised descriptors into a forest of `TreeNode`s.
///
/// Nodes are appended to a flat arena while building, and a path-keyed map
/// finds the node for any prefix in O(1), so each descriptor costs one map
/// lookup per segment. Parents are always pushed before their children,
/// which lets `finish` assemble the owned tree in a single reverse pass with
/// no recursion.
use super::normalize::canonical_segments;
use crate::error::{IngestError, Result};
use crate::model::{IngestionBatch, NodeKind, RawFileDescriptor, TreeNode};
use compact_str::CompactString;
use std::collections::HashMap;
use tracing::warn;

struct Slot {
    /// The node itself, with an empty child list until `finish`.
    node: TreeNode,
    /// Arena indices of children, first-insertion order.
    children: Vec<usize>,
}

/// Order-preserving, stateless-between-calls fold of descriptors into a forest.
#[derive(Default)]
pub struct TreeBuilder {
    slots: Vec<Slot>,
    roots: Vec<usize>,
    /// Canonical path -> arena index.
    index: HashMap<String, usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Add one descriptor, creating intermediate directories on demand.
    ///
    /// A file arriving at an existing file path replaces it in place. A
    /// directory placeholder at an existing directory is a no-op.
    pub fn insert(&mut self, desc: RawFileDescriptor) -> Result<()> {
        let segments = canonical_segments(&desc)?;
        let RawFileDescriptor {
            byte_size,
            mut mime_type,
            last_modified,
            mut contents,
            is_directory,
            ..
        } = desc;

        let last = segments.len() - 1;
        let mut parent: Option<usize> = None;
        let mut path = String::new();

        for (depth, segment) in segments.iter().enumerate() {
            if depth > 0 {
                path.push('/');
            }
            path.push_str(segment);
            let existing = self.index.get(&path).copied();

            if depth < last || is_directory {
                let idx = match existing {
                    Some(idx) if !self.slots[idx].node.is_dir() => {
                        return Err(conflict(&path, "file", "directory"));
                    }
                    Some(idx) => idx,
                    None => self.push(
                        parent,
                        TreeNode::new_dir(CompactString::new(segment), path.clone(), last_modified),
                    ),
                };
                parent = Some(idx);
                continue;
            }

            let node = TreeNode::new_file(
                CompactString::new(segment),
                path.clone(),
                byte_size,
                std::mem::take(&mut mime_type),
                contents.take(),
                last_modified,
            );
            match existing {
                Some(idx) if self.slots[idx].node.is_dir() => {
                    return Err(conflict(&path, "directory", "file"));
                }
                Some(idx) => self.slots[idx].node = node,
                None => {
                    self.push(parent, node);
                }
            }
        }
        Ok(())
    }

    /// Attach a read warning to the directory at `path`.
    ///
    /// Returns `false` if no directory exists there.
    pub fn attach_warning(&mut self, path: &str, message: &str) -> bool {
        let Some(&idx) = self.index.get(path) else {
            warn!("No directory at '{path}' to attach warning: {message}");
            return false;
        };
        match &mut self.slots[idx].node.kind {
            NodeKind::Directory { warning, .. } => {
                *warning = Some(match warning.take() {
                    Some(prev) => format!("{prev}; {message}"),
                    None => message.to_string(),
                });
                true
            }
            NodeKind::File { .. } => {
                warn!("Cannot attach warning to file '{path}': {message}");
                false
            }
        }
    }

    /// Assemble the owned forest.
    ///
    /// Iterating in reverse guarantees every child is complete before its
    /// parent collects it.
    pub fn finish(self) -> IngestionBatch {
        let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(self.slots.len());
        built.resize_with(self.slots.len(), || None);

        for (i, slot) in self.slots.into_iter().enumerate().rev() {
            let mut node = slot.node;
            if let NodeKind::Directory { children, .. } = &mut node.kind {
                *children = slot
                    .children
                    .iter()
                    .filter_map(|&c| built[c].take())
                    .collect();
            }
            built[i] = Some(node);
        }

        self.roots
            .iter()
            .filter_map(|&r| built[r].take())
            .collect()
    }

    fn push(&mut self, parent: Option<usize>, node: TreeNode) -> usize {
        let idx = self.slots.len();
        self.index.insert(node.path.clone(), idx);
        self.slots.push(Slot {
            node,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.slots[p].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }
}

/// Build a forest from descriptors in order.
pub fn build_forest<I>(descriptors: I) -> Result<IngestionBatch>
where
    I: IntoIterator<Item = RawFileDescriptor>,
{
    let mut builder = TreeBuilder::new();
    for desc in descriptors {
        builder.insert(desc)?;
    }
    Ok(builder.finish())
}

fn conflict(path: &str, existing: &'static str, requested: &'static str) -> IngestError {
    IngestError::PathKindConflict {
        path: path.to_string(),
        existing,
        requested,
    }
}
