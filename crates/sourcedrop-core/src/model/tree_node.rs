/// Canonical ingested unit: a file or a directory with owned children.
///
/// Unlike a scan tree, an ingestion batch is small (what a user drops at
/// once) and is handed off by value to the analyzer and the Selection, so
/// nodes own their children directly instead of living in an arena.
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// File or directory payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File {
        size: u64,
        mime_type: String,
        contents: Option<Vec<u8>>,
    },
    Directory {
        /// First-insertion order, not sorted.
        children: Vec<TreeNode>,
        /// Set when part of this directory could not be read.
        warning: Option<String>,
    },
}

/// Fields computed by the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub id: String,
    pub created: String,
    pub modified: String,
    pub accessed: String,
    pub size_display: String,
    pub item_type: String,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Single path segment.
    pub name: CompactString,
    /// Ancestor names and `name`, joined by `/`.
    pub path: String,
    pub last_modified: DateTime<Utc>,
    pub kind: NodeKind,
    /// Filled in by the analyzer; `None` until then.
    pub details: Option<ItemDetails>,
}

impl TreeNode {
    pub fn new_file(
        name: CompactString,
        path: String,
        size: u64,
        mime_type: String,
        contents: Option<Vec<u8>>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            path,
            last_modified,
            kind: NodeKind::File {
                size,
                mime_type,
                contents,
            },
            details: None,
        }
    }

    pub fn new_dir(name: CompactString, path: String, last_modified: DateTime<Utc>) -> Self {
        Self {
            name,
            path,
            last_modified,
            kind: NodeKind::Directory {
                children: Vec::new(),
                warning: None,
            },
            details: None,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Own size in bytes: the file size, or 0 for a directory.
    pub fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File { size, .. } => *size,
            NodeKind::Directory { .. } => 0,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            NodeKind::File { .. } => &[],
            NodeKind::Directory { children, .. } => children,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { .. } => None,
            NodeKind::Directory { warning, .. } => warning.as_deref(),
        }
    }

    pub fn mime_type(&self) -> &str {
        match &self.kind {
            NodeKind::File { mime_type, .. } => mime_type,
            NodeKind::Directory { .. } => "",
        }
    }

    /// This node followed by every descendant, depth-first, in child order.
    ///
    /// Uses an explicit stack so arbitrarily deep trees cannot overflow.
    pub fn descendants(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            // Reverse so the first child is popped first.
            stack.extend(node.children().iter().rev());
        }
        out
    }

    /// Sum of all file sizes at or below this node.
    pub fn total_size(&self) -> u64 {
        self.descendants().iter().map(|n| n.size()).sum()
    }

    /// Number of files at or below this node.
    pub fn file_count(&self) -> u64 {
        self.descendants().iter().filter(|n| !n.is_dir()).count() as u64
    }

    /// Find a node by its canonical path, searching this subtree.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let mut current = self;
        if current.path == path {
            return Some(current);
        }
        // Descend one matching child per level instead of scanning everything.
        loop {
            let next = current.children().iter().find(|c| {
                path == c.path
                    || (path.starts_with(c.path.as_str())
                        && path.as_bytes().get(c.path.len()) == Some(&b'/'))
            })?;
            if next.path == path {
                return Some(next);
            }
            current = next;
        }
    }

    /// Sort every level in display order: directories first, then by name.
    ///
    /// The builder preserves insertion order; call this only for display.
    pub fn sort_for_display(&mut self) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let NodeKind::Directory { children, .. } = &mut node.kind {
                children.sort_by(|a, b| {
                    b.is_dir()
                        .cmp(&a.is_dir())
                        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                });
                stack.extend(children.iter_mut());
            }
        }
    }
}
