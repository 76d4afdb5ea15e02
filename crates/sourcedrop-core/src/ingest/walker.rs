/// Directory walker: flattens a dropped directory into file descriptors.
///
/// The native directory API is paginated, so each directory is read
/// through repeated `read_batch` calls until one comes back empty. Traversal
/// is depth-first over an explicit stack of open directories: a
/// subdirectory is pushed and fully drained before its parent's remaining
/// siblings are looked at, and no recursion is involved, so depth is bounded
/// only by memory.
///
/// A directory that cannot be read fails on its own. Its siblings are still
/// walked, and the failure comes back as a `WalkWarning` together with a
/// placeholder descriptor so the directory still shows up, empty, in the
/// tree.
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::model::RawFileDescriptor;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// System file names that are never worth ingesting.
const SYSTEM_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Directory names skipped entirely.
const SYSTEM_DIRS: &[&str] = &["__MACOSX"];

/// One entry returned by a paginated directory read.
pub enum DirectoryEntry {
    /// A file. Its `relative_path` is filled in by the walker.
    File(RawFileDescriptor),
    Directory(Box<dyn DirectoryHandle>),
}

/// Opaque provider over a native directory.
pub trait DirectoryHandle: Send {
    /// The directory's own name (one path segment).
    fn name(&self) -> &str;

    fn last_modified(&self) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    /// Next page of entries. An empty page means end-of-directory.
    fn read_batch(&mut self) -> Result<Vec<DirectoryEntry>>;
}

/// A subtree that could not be fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkWarning {
    /// Canonical path of the directory that failed.
    pub path: String,
    pub message: String,
}

/// Flat result of walking one directory handle.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub descriptors: Vec<RawFileDescriptor>,
    pub warnings: Vec<WalkWarning>,
}

/// An open directory on the walk stack.
struct Frame {
    handle: Box<dyn DirectoryHandle>,
    path: String,
    /// Entries of the current page not yet visited.
    pending: VecDeque<DirectoryEntry>,
    /// `descriptors.len()` when this directory was entered.
    emitted_before: usize,
}

impl Frame {
    fn new(handle: Box<dyn DirectoryHandle>, path: String, emitted_before: usize) -> Self {
        Self {
            handle,
            path,
            pending: VecDeque::new(),
            emitted_before,
        }
    }
}

/// Walk a directory handle into a flat descriptor list.
pub fn walk_directory(root: Box<dyn DirectoryHandle>) -> WalkOutcome {
    let mut out = WalkOutcome::default();
    let root_path = root.name().to_string();
    let mut stack = vec![Frame::new(root, root_path, 0)];
    let mut pages: u64 = 0;

    while let Some(frame) = stack.last_mut() {
        if frame.pending.is_empty() {
            pages += 1;
            match frame.handle.read_batch() {
                Ok(batch) if !batch.is_empty() => {
                    frame.pending.extend(batch);
                }
                Ok(_) => {
                    // End of directory. Keep empty directories visible.
                    if out.descriptors.len() == frame.emitted_before {
                        out.descriptors.push(RawFileDescriptor::directory_placeholder(
                            frame.path.clone(),
                            frame.handle.last_modified(),
                        ));
                    }
                    stack.pop();
                    continue;
                }
                Err(err) => {
                    warn!("Skipping unreadable directory {}: {err}", frame.path);
                    out.warnings.push(WalkWarning {
                        path: frame.path.clone(),
                        message: err.to_string(),
                    });
                    out.descriptors.push(RawFileDescriptor::directory_placeholder(
                        frame.path.clone(),
                        frame.handle.last_modified(),
                    ));
                    stack.pop();
                    continue;
                }
            }
        }

        let Some(entry) = frame.pending.pop_front() else {
            continue;
        };
        match entry {
            DirectoryEntry::File(mut desc) => {
                desc.relative_path = format!("{}/{}", frame.path, desc.name);
                out.descriptors.push(desc);
            }
            DirectoryEntry::Directory(handle) => {
                let path = format!("{}/{}", frame.path, handle.name());
                let emitted = out.descriptors.len();
                stack.push(Frame::new(handle, path, emitted));
            }
        }
    }

    debug!(
        "Walk complete: {} descriptors, {} warnings, {} pages",
        out.descriptors.len(),
        out.warnings.len(),
        pages
    );
    out
}

/// Returns true if the given file/directory name should be excluded.
pub fn is_hidden_or_system(name: &str) -> bool {
    name.starts_with('.') || SYSTEM_FILES.contains(&name) || SYSTEM_DIRS.contains(&name)
}

// ── Filesystem provider ──────────────────────────────────────────────────────

/// `DirectoryHandle` over a real directory, paging through `read_dir`.
///
/// The directory is opened lazily on the first read so that an open
/// failure surfaces as a read failure of this subtree only. File contents
/// are not read here; see [`load_contents`].
pub struct FsDirectory {
    path: PathBuf,
    name: String,
    modified: DateTime<Utc>,
    entries: Option<std::fs::ReadDir>,
    page_size: usize,
    skip_hidden: bool,
}

impl FsDirectory {
    pub fn open(path: impl Into<PathBuf>, config: &IngestConfig) -> Self {
        let path = path.into();
        let name = display_name(&path);
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            path,
            name,
            modified,
            entries: None,
            page_size: config.page_size.max(1),
            skip_hidden: config.skip_hidden,
        }
    }

    fn child(&self, path: PathBuf) -> Self {
        let mut child = Self {
            name: display_name(&path),
            path,
            modified: DateTime::<Utc>::UNIX_EPOCH,
            entries: None,
            page_size: self.page_size,
            skip_hidden: self.skip_hidden,
        };
        if let Ok(modified) = std::fs::metadata(&child.path).and_then(|m| m.modified()) {
            child.modified = modified.into();
        }
        child
    }

    fn read_failure(&self, err: std::io::Error) -> IngestError {
        IngestError::DirectoryReadFailure {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl DirectoryHandle for FsDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn read_batch(&mut self) -> Result<Vec<DirectoryEntry>> {
        if self.entries.is_none() {
            let read_dir = std::fs::read_dir(&self.path).map_err(|e| self.read_failure(e))?;
            self.entries = Some(read_dir);
        }

        let mut batch = Vec::with_capacity(self.page_size);
        // Keep pulling past filtered entries so a page full of hidden files
        // is not mistaken for end-of-directory.
        while batch.len() < self.page_size {
            let Some(next) = self.entries.as_mut().and_then(|it| it.next()) else {
                break;
            };
            let entry = match next {
                Ok(e) => e,
                Err(err) => {
                    warn!("Skipping unreadable entry in {}: {err}", self.path.display());
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if self.skip_hidden && is_hidden_or_system(&name) {
                continue;
            }
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(err) => {
                    warn!("Skipping {}: {err}", entry.path().display());
                    continue;
                }
            };

            if file_type.is_dir() {
                batch.push(DirectoryEntry::Directory(Box::new(self.child(entry.path()))));
            } else if file_type.is_file() {
                let meta = match entry.metadata() {
                    Ok(m) => m,
                    Err(err) => {
                        warn!("Skipping {}: {err}", entry.path().display());
                        continue;
                    }
                };
                let modified = meta
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                batch.push(DirectoryEntry::File(
                    RawFileDescriptor::loose(CompactString::new(&name), meta.len())
                        .with_last_modified(modified)
                        .with_source(entry.path()),
                ));
            }
            // Symlinks and special files are not followed.
        }
        Ok(batch)
    }
}

/// Describe a single file on disk as a loose descriptor (no contents yet).
pub fn describe_file(path: &Path) -> Result<RawFileDescriptor> {
    let meta = std::fs::metadata(path).map_err(|e| IngestError::DirectoryReadFailure {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    Ok(
        RawFileDescriptor::loose(CompactString::new(display_name(path)), meta.len())
            .with_last_modified(modified)
            .with_source(path),
    )
}

/// Read file bytes for every descriptor that has a `source` and no contents.
///
/// Runs on a rayon pool sized to the machine. Files larger than
/// `max_bytes` and files that fail to read keep their metadata only; each
/// failure is logged and counted in the returned value.
pub fn load_contents(descriptors: &mut [RawFileDescriptor], max_bytes: u64) -> usize {
    let load = |descriptors: &mut [RawFileDescriptor]| {
        descriptors
            .par_iter_mut()
            .filter(|d| d.contents.is_none() && !d.is_directory && d.byte_size <= max_bytes)
            .map(|d| {
                let Some(source) = d.source.as_ref() else {
                    return 0;
                };
                match std::fs::read(source) {
                    Ok(bytes) => {
                        d.byte_size = bytes.len() as u64;
                        d.contents = Some(bytes);
                        0
                    }
                    Err(err) => {
                        warn!("Could not read {}: {err}", source.display());
                        1
                    }
                }
            })
            .sum::<usize>()
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|i| format!("sourcedrop-read-{i}"))
        .build()
    {
        Ok(pool) => pool.install(|| load(descriptors)),
        Err(err) => {
            debug!("Dedicated read pool unavailable ({err}), using global pool");
            load(descriptors)
        }
    }
}

fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.to_string_lossy().trim_end_matches(['/', '\\']).to_string(),
    }
}

// ── In-memory provider ───────────────────────────────────────────────────────

/// `DirectoryHandle` over an in-memory listing.
///
/// Used for sources that hand over whole listings (and in tests). Pages
/// are `page_size` entries long, and the handle can be told to fail after a
/// number of pages to mimic an unreadable directory.
pub struct MemoryDirectory {
    name: String,
    modified: DateTime<Utc>,
    entries: VecDeque<MemoryEntry>,
    page_size: usize,
    fail_after_pages: Option<(usize, String)>,
    pages_served: usize,
}

enum MemoryEntry {
    File(RawFileDescriptor),
    Directory(MemoryDirectory),
}

impl MemoryDirectory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modified: DateTime::<Utc>::UNIX_EPOCH,
            entries: VecDeque::new(),
            page_size: DEFAULT_MEMORY_PAGE,
            fail_after_pages: None,
            pages_served: 0,
        }
    }

    /// Add a file with the given contents.
    pub fn file(mut self, name: &str, contents: &[u8]) -> Self {
        self.entries.push_back(MemoryEntry::File(
            RawFileDescriptor::loose(name, 0).with_contents(contents.to_vec()),
        ));
        self
    }

    pub fn descriptor(mut self, desc: RawFileDescriptor) -> Self {
        self.entries.push_back(MemoryEntry::File(desc));
        self
    }

    pub fn dir(mut self, child: MemoryDirectory) -> Self {
        self.entries.push_back(MemoryEntry::Directory(child));
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = modified;
        self
    }

    /// Fail every read after `pages` successful pages.
    pub fn failing_after(mut self, pages: usize, message: impl Into<String>) -> Self {
        self.fail_after_pages = Some((pages, message.into()));
        self
    }
}

const DEFAULT_MEMORY_PAGE: usize = 100;

impl DirectoryHandle for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn read_batch(&mut self) -> Result<Vec<DirectoryEntry>> {
        if let Some((limit, message)) = &self.fail_after_pages {
            if self.pages_served >= *limit {
                return Err(IngestError::DirectoryReadFailure {
                    path: self.name.clone(),
                    message: message.clone(),
                });
            }
        }
        self.pages_served += 1;
        let take = self.page_size.min(self.entries.len());
        Ok(self
            .entries
            .drain(..take)
            .map(|entry| match entry {
                MemoryEntry::File(desc) => DirectoryEntry::File(desc),
                MemoryEntry::Directory(dir) => DirectoryEntry::Directory(Box::new(dir)),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn paths(outcome: &WalkOutcome) -> Vec<&str> {
        outcome
            .descriptors
            .iter()
            .map(|d| d.relative_path.as_str())
            .collect()
    }

    #[test]
    fn test_paths_rooted_at_dropped_directory() {
        let root = MemoryDirectory::new("proj")
            .dir(MemoryDirectory::new("src").file("x.js", b"let x;"))
            .file("readme.md", b"# hi");
        let outcome = walk_directory(Box::new(root));
        assert_eq!(paths(&outcome), vec!["proj/src/x.js", "proj/readme.md"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_pagination_reads_until_empty() {
        let mut root = MemoryDirectory::new("many").page_size(3);
        for i in 0..10 {
            root = root.file(&format!("f{i}.txt"), b"x");
        }
        let outcome = walk_directory(Box::new(root));
        assert_eq!(outcome.descriptors.len(), 10);
        assert_eq!(outcome.descriptors[9].relative_path, "many/f9.txt");
    }

    #[test]
    fn test_depth_first_before_siblings() {
        let root = MemoryDirectory::new("r")
            .page_size(1)
            .dir(MemoryDirectory::new("a").file("1", b"").dir(MemoryDirectory::new("b").file("2", b"")))
            .file("3", b"");
        let outcome = walk_directory(Box::new(root));
        assert_eq!(paths(&outcome), vec!["r/a/1", "r/a/b/2", "r/3"]);
    }

    #[test]
    fn test_failure_is_local_to_subtree() {
        let root = MemoryDirectory::new("r")
            .file("before.txt", b"1")
            .dir(MemoryDirectory::new("locked").file("secret", b"2").failing_after(0, "access denied"))
            .file("after.txt", b"3");
        let outcome = walk_directory(Box::new(root));

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].path, "r/locked");
        assert!(outcome.warnings[0].message.contains("access denied"));
        assert_eq!(paths(&outcome), vec!["r/before.txt", "r/locked", "r/after.txt"]);
        assert!(outcome.descriptors[1].is_directory);
    }

    #[test]
    fn test_partial_failure_keeps_earlier_pages() {
        let locked = MemoryDirectory::new("half")
            .page_size(1)
            .file("ok.txt", b"1")
            .file("lost.txt", b"2")
            .failing_after(1, "I/O error");
        let outcome = walk_directory(Box::new(MemoryDirectory::new("r").dir(locked)));
        assert_eq!(paths(&outcome), vec!["r/half/ok.txt", "r/half"]);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_empty_directory_placeholder() {
        let root = MemoryDirectory::new("r").dir(MemoryDirectory::new("empty"));
        let outcome = walk_directory(Box::new(root));
        assert_eq!(paths(&outcome), vec!["r/empty"]);
        assert!(outcome.descriptors[0].is_directory);
    }

    #[test]
    fn test_deep_tree_does_not_overflow() {
        let mut dir = MemoryDirectory::new("d0").file("leaf", b"x");
        for i in 1..1_000 {
            dir = MemoryDirectory::new(format!("d{i}")).dir(dir);
        }
        let outcome = walk_directory(Box::new(dir));
        assert_eq!(outcome.descriptors.len(), 1);
        assert!(outcome.descriptors[0].relative_path.ends_with("d1/d0/leaf"));
    }

    #[test]
    fn test_fs_directory_walk_and_filtering() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("__MACOSX")).unwrap();
        fs::write(root.join("src/x.js"), "let x = 1;").unwrap();
        fs::write(root.join("readme.md"), "hello").unwrap();
        fs::write(root.join(".DS_Store"), "junk").unwrap();
        fs::write(root.join("__MACOSX/junk"), "junk").unwrap();

        let config = IngestConfig {
            page_size: 1,
            ..IngestConfig::default()
        };
        let mut outcome = walk_directory(Box::new(FsDirectory::open(&root, &config)));
        let mut got = paths(&outcome).into_iter().map(String::from).collect::<Vec<_>>();
        got.sort();
        assert_eq!(got, vec!["proj/readme.md", "proj/src/x.js"]);

        assert_eq!(load_contents(&mut outcome.descriptors, u64::MAX), 0);
        let readme = outcome
            .descriptors
            .iter()
            .find(|d| d.name == "readme.md")
            .unwrap();
        assert_eq!(readme.contents.as_deref(), Some(&b"hello"[..]));
        assert_eq!(readme.byte_size, 5);
    }

    #[test]
    fn test_fs_missing_directory_warns() {
        let tmp = tempfile::tempdir().unwrap();
        let config = IngestConfig::default();
        let outcome = walk_directory(Box::new(FsDirectory::open(tmp.path().join("gone"), &config)));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].path, "gone");
    }

    #[test]
    fn test_load_contents_respects_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("big.bin");
        fs::write(&path, vec![0u8; 64]).unwrap();
        let mut descs = vec![describe_file(&path).unwrap()];
        load_contents(&mut descs, 10);
        assert!(descs[0].contents.is_none());
        assert_eq!(descs[0].byte_size, 64);
    }

    #[test]
    fn test_is_hidden_or_system() {
        assert!(is_hidden_or_system(".hidden"));
        assert!(is_hidden_or_system("Thumbs.db"));
        assert!(is_hidden_or_system("__MACOSX"));
        assert!(!is_hidden_or_system("normal.txt"));
    }
}
