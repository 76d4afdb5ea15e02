/// A file as it arrives from an input source, before normalisation.
///
/// Drag-and-drop, the file picker and the directory walker all produce
/// these. `relative_path` is empty for loose files; directory-aware inputs
/// fill it with a `/`-separated path rooted at the dropped directory.
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileDescriptor {
    /// Path relative to the drop root, or empty for a loose file.
    pub relative_path: String,
    /// File or directory name (a single segment).
    pub name: CompactString,
    /// Size in bytes as reported by the source.
    pub byte_size: u64,
    /// Best-effort MIME type. May be empty.
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    /// File bytes. Absent for directory placeholders and for files whose
    /// contents were not loaded.
    pub contents: Option<Vec<u8>>,
    /// Placeholder for a directory that has no file descendants
    /// (empty or unreadable) so it still appears in the tree.
    pub is_directory: bool,
    /// Where the bytes live on disk, for sources that enumerate metadata
    /// first and load contents afterwards.
    pub source: Option<PathBuf>,
}

impl RawFileDescriptor {
    /// A loose file with no nesting.
    pub fn loose(name: impl Into<CompactString>, byte_size: u64) -> Self {
        Self {
            relative_path: String::new(),
            name: name.into(),
            byte_size,
            mime_type: String::new(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            contents: None,
            is_directory: false,
            source: None,
        }
    }

    /// A file nested under a dropped directory.
    pub fn nested(relative_path: impl Into<String>, byte_size: u64) -> Self {
        let relative_path = relative_path.into();
        let name = relative_path
            .rsplit('/')
            .next()
            .map(CompactString::from)
            .unwrap_or_default();
        Self {
            relative_path,
            name,
            byte_size,
            ..Self::loose("", 0)
        }
    }

    /// A placeholder that stands for a directory at `relative_path`.
    pub fn directory_placeholder(
        relative_path: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let mut desc = Self::nested(relative_path, 0);
        desc.is_directory = true;
        desc.last_modified = last_modified;
        desc
    }

    pub fn with_contents(mut self, contents: Vec<u8>) -> Self {
        self.byte_size = contents.len() as u64;
        self.contents = Some(contents);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }
}
