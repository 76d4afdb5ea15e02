/// Analysis collaborator: enriches an ingestion batch with item details.
///
/// The session only depends on the [`Analyzer`] trait. [`LocalAnalyzer`]
/// computes the details in-process; a remote service can implement the same
/// trait and apply its own timeout, reporting it as `AnalysisFailure`.
pub mod item_type;

pub use item_type::{classify, ItemType};

use crate::error::{IngestError, Result};
use crate::model::size::format_size;
use crate::model::{IngestionBatch, ItemDetails, NodeKind, TreeNode};
use std::collections::HashMap;

/// Enriches a validated batch. Output paths must be a subset of the input
/// paths, each under its original parent with its original name and kind.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, batch: IngestionBatch) -> Result<IngestionBatch>;
}

/// In-process analyzer: timestamps, display size, type and extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAnalyzer;

impl Analyzer for LocalAnalyzer {
    fn analyze(&self, mut batch: IngestionBatch) -> Result<IngestionBatch> {
        for root in &mut batch {
            let totals = subtree_totals(root);
            // Same push order as `subtree_totals`, so visit order matches.
            let mut stack: Vec<&mut TreeNode> = vec![root];
            let mut index = 0;
            while let Some(node) = stack.pop() {
                node.details = Some(details_for(node, totals[index]));
                index += 1;
                if let NodeKind::Directory { children, .. } = &mut node.kind {
                    stack.extend(children.iter_mut());
                }
            }
        }
        Ok(batch)
    }
}

/// Total file bytes under every node of `root`, in stack visit order.
///
/// Descendants are always visited after their ancestors, so a single
/// reverse pass folds each total into its parent.
fn subtree_totals(root: &TreeNode) -> Vec<u64> {
    let mut totals: Vec<u64> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    let mut stack: Vec<(&TreeNode, Option<usize>)> = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let index = totals.len();
        totals.push(node.size());
        parents.push(parent);
        stack.extend(node.children().iter().map(|child| (child, Some(index))));
    }
    for index in (0..totals.len()).rev() {
        if let Some(parent) = parents[index] {
            totals[parent] += totals[index];
        }
    }
    totals
}

fn details_for(node: &TreeNode, total_size: u64) -> ItemDetails {
    let timestamp = node.last_modified.to_rfc3339();
    let (item_type, extension) = match &node.kind {
        NodeKind::Directory { .. } => (ItemType::Directory, String::new()),
        NodeKind::File { mime_type, .. } => (
            classify(&node.name, mime_type),
            item_type::extension_of(&node.name),
        ),
    };
    ItemDetails {
        id: node.path.clone(),
        created: timestamp.clone(),
        modified: timestamp.clone(),
        accessed: timestamp,
        size_display: format_size(total_size),
        item_type: item_type.label().to_string(),
        extension,
    }
}

/// Where a node sits and what it is.
#[derive(Debug, PartialEq, Eq)]
struct Placement {
    parent: Option<String>,
    name: String,
    is_dir: bool,
}

/// Placement of every node in a forest, recorded before analysis so the
/// analyzer's output can be checked without keeping a copy of the batch.
#[derive(Debug, Default)]
pub struct TreeShape {
    nodes: HashMap<String, Placement>,
}

impl TreeShape {
    pub fn of(forest: &[TreeNode]) -> Self {
        let nodes = placements(forest)
            .map(|(parent, node)| {
                (
                    node.path.clone(),
                    Placement {
                        parent: parent.map(str::to_string),
                        name: node.name.to_string(),
                        is_dir: node.is_dir(),
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    /// Every node of `output` must have the path, parent, name and kind it
    /// had in the recorded forest. Dropping nodes is allowed; adding,
    /// moving, renaming or changing a node's kind is not.
    pub fn check(&self, output: &[TreeNode]) -> Result<()> {
        for (parent, node) in placements(output) {
            let path = node.path.as_str();
            let Some(expected) = self.nodes.get(path) else {
                return Err(unexpected(format!("analyzer returned unexpected path '{path}'")));
            };
            if expected.parent.as_deref() != parent {
                return Err(unexpected(format!("analyzer moved '{path}'")));
            }
            if expected.name != node.name.as_str() {
                return Err(unexpected(format!(
                    "analyzer renamed '{path}' to '{}'",
                    node.name
                )));
            }
            if expected.is_dir != node.is_dir() {
                return Err(unexpected(format!("analyzer changed the kind of '{path}'")));
            }
        }
        Ok(())
    }
}

fn unexpected(message: String) -> IngestError {
    IngestError::AnalysisFailure(message)
}

/// Check that an analyzer returned only nodes it was given, each in the
/// same place in the tree and otherwise unchanged in shape.
pub fn verify_no_reparenting(input: &[TreeNode], output: &[TreeNode]) -> Result<()> {
    TreeShape::of(input).check(output)
}

/// (parent path, node) for every node in a forest.
fn placements(forest: &[TreeNode]) -> impl Iterator<Item = (Option<&str>, &TreeNode)> {
    forest.iter().flat_map(|root| {
        let mut out = vec![(None, root)];
        for node in root.descendants() {
            for child in node.children() {
                out.push((Some(node.path.as_str()), child));
            }
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::builder::build_forest;
    use crate::model::RawFileDescriptor;

    fn sample() -> IngestionBatch {
        build_forest(vec![
            RawFileDescriptor::nested("proj/src/x.js", 2048).with_last_modified(
                chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            ),
            RawFileDescriptor::nested("proj/logo.PNG", 10),
            RawFileDescriptor::loose("song", 5).with_mime_type("audio/ogg"),
        ])
        .unwrap()
    }

    #[test]
    fn test_every_node_enriched() {
        let batch = LocalAnalyzer.analyze(sample()).unwrap();
        for root in &batch {
            for node in root.descendants() {
                let details = node.details.as_ref().expect("details missing");
                assert_eq!(details.id, node.path);
            }
        }
    }

    #[test]
    fn test_details_fields() {
        let batch = LocalAnalyzer.analyze(sample()).unwrap();
        let proj = &batch[0];
        assert_eq!(proj.details.as_ref().unwrap().item_type, "Directory");
        assert_eq!(proj.details.as_ref().unwrap().size_display, "2.01 KB");

        let x = proj.find("proj/src/x.js").unwrap().details.clone().unwrap();
        assert_eq!(x.item_type, "Text");
        assert_eq!(x.extension, "js");
        assert_eq!(x.size_display, "2.00 KB");
        assert!(x.modified.starts_with("2023-11-14T22:13:20"), "{}", x.modified);

        let logo = proj.find("proj/logo.PNG").unwrap().details.clone().unwrap();
        assert_eq!(logo.item_type, "Image");
        assert_eq!(logo.extension, "png");

        assert_eq!(batch[1].details.as_ref().unwrap().item_type, "Audio");
    }

    #[test]
    fn test_structure_untouched() {
        let input = sample();
        let output = LocalAnalyzer.analyze(input.clone()).unwrap();
        verify_no_reparenting(&input, &output).unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output[0].file_count(), input[0].file_count());
    }

    #[test]
    fn test_reparenting_detected() {
        let input = sample();
        let mut output = input.clone();
        // Move proj/src up to the root level.
        let src = match &mut output[0].kind {
            NodeKind::Directory { children, .. } => children.remove(0),
            NodeKind::File { .. } => unreachable!(),
        };
        output.push(src);
        assert!(matches!(
            verify_no_reparenting(&input, &output),
            Err(IngestError::AnalysisFailure(_))
        ));

        let mut extra = input.clone();
        extra.push(TreeNode::new_dir("ghost".into(), "ghost".into(), input[0].last_modified));
        assert!(verify_no_reparenting(&input, &extra).is_err());

        // Dropping nodes is allowed: output is a subset.
        verify_no_reparenting(&input, &input[..1]).unwrap();
    }

    #[test]
    fn test_rename_and_kind_change_detected() {
        let input = sample();

        let mut renamed = input.clone();
        renamed[1].name = "renamed".into();
        let err = verify_no_reparenting(&input, &renamed).unwrap_err();
        assert!(err.to_string().contains("renamed 'song'"), "{err}");

        let mut retyped = input.clone();
        retyped[1] = TreeNode::new_dir("song".into(), "song".into(), input[1].last_modified);
        let err = verify_no_reparenting(&input, &retyped).unwrap_err();
        assert!(err.to_string().contains("changed the kind of 'song'"), "{err}");
    }

    #[test]
    fn test_totals_match_total_size() {
        let batch = sample();
        for root in &batch {
            let totals = subtree_totals(root);
            assert_eq!(totals.len(), root.descendants().len());
            assert_eq!(totals[0], root.total_size());
        }
        let enriched = LocalAnalyzer.analyze(batch).unwrap();
        let src = enriched[0].find("proj/src").unwrap();
        assert_eq!(src.details.as_ref().unwrap().size_display, "2.00 KB");
    }
}
