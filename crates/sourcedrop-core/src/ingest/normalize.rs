/// Path normaliser: raw descriptor -> canonical path segments.
///
/// Directory-aware inputs carry a relative path rooted at the dropped
/// directory; loose files carry only a name. Either way the result is a
/// non-empty list of non-empty segments.
use crate::error::{IngestError, Result};
use crate::model::RawFileDescriptor;

/// Canonical segments for a descriptor.
///
/// Only `/` separates segments. Any other character, `\` included, is part
/// of a name.
pub fn canonical_segments(desc: &RawFileDescriptor) -> Result<Vec<String>> {
    if desc.relative_path.is_empty() {
        let name = desc.name.as_str();
        if name.contains('/') {
            return Err(malformed(name, "loose file name contains a separator"));
        }
        validate_segment(name, name)?;
        return Ok(vec![name.to_string()]);
    }

    let full = desc.relative_path.as_str();
    let segments: Vec<String> = full.split('/').map(str::to_string).collect();
    for segment in &segments {
        validate_segment(segment, full)?;
    }
    Ok(segments)
}

/// Canonical path string: segments joined by `/`.
pub fn canonical_path(desc: &RawFileDescriptor) -> Result<String> {
    canonical_segments(desc).map(|s| s.join("/"))
}

fn validate_segment(segment: &str, full: &str) -> Result<()> {
    match segment {
        "" => Err(malformed(full, "empty path segment")),
        "." | ".." => Err(malformed(full, "relative path segment")),
        _ => Ok(()),
    }
}

fn malformed(path: &str, reason: &'static str) -> IngestError {
    IngestError::MalformedPath {
        path: path.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_file_uses_name() {
        let desc = RawFileDescriptor::loose("a.txt", 10);
        assert_eq!(canonical_segments(&desc).unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_relative_path_is_split() {
        let desc = RawFileDescriptor::nested("proj/src/x.js", 1);
        assert_eq!(canonical_path(&desc).unwrap(), "proj/src/x.js");
        assert_eq!(canonical_segments(&desc).unwrap().len(), 3);
    }

    #[test]
    fn test_backslash_is_part_of_the_name() {
        let desc = RawFileDescriptor::nested("proj/a\\b.txt", 1);
        assert_eq!(canonical_segments(&desc).unwrap(), vec!["proj", "a\\b.txt"]);

        let desc = RawFileDescriptor::loose("x\\y.txt", 1);
        assert_eq!(canonical_segments(&desc).unwrap(), vec!["x\\y.txt"]);
    }

    #[test]
    fn test_empty_segment_rejected() {
        for bad in ["proj//x.js", "/proj/x.js", "proj/x/"] {
            let desc = RawFileDescriptor::nested(bad, 1);
            let err = canonical_segments(&desc).unwrap_err();
            assert!(
                matches!(err, IngestError::MalformedPath { .. }),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn test_dot_segments_rejected() {
        let desc = RawFileDescriptor::nested("proj/../etc/passwd", 1);
        assert!(canonical_segments(&desc).is_err());
    }

    #[test]
    fn test_loose_empty_name_rejected() {
        let desc = RawFileDescriptor::loose("", 1);
        assert!(canonical_segments(&desc).is_err());
        let desc = RawFileDescriptor::loose("a/b", 1);
        assert!(canonical_segments(&desc).is_err());
    }
}
