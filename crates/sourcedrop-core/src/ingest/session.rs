/// Ingestion session: owns the Selection and runs one ingestion round at a
/// time.
///
/// A round runs on a background thread (walk -> normalise -> build -> dedup
/// -> analyse) and reports back over a bounded crossbeam channel. The owner
/// drains that channel with `process_messages()` (once per frame in the
/// GUI), so every Selection mutation happens on the owning thread and
/// appends and removals never race.
///
/// Dedup runs twice. The worker filters against a snapshot of the root
/// paths taken at `submit`, so already-selected entries are neither walked
/// nor sent to the analyzer. The merge re-checks against the live Selection, which keeps
/// paths unique even if the user removed or re-added entries meanwhile.
use super::builder::TreeBuilder;
use super::walker::{self, DirectoryHandle, FsDirectory, WalkWarning};
use crate::analysis::{Analyzer, TreeShape};
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::model::{IngestionBatch, RawFileDescriptor, TreeNode};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of progress messages that may queue up in the channel.
///
/// A round sends a handful of messages plus one per unreadable directory,
/// so the worker only blocks here when a drop hits hundreds of locked
/// directories while the UI is not draining.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Maximum progress messages applied per `process_messages` call.
const MAX_MESSAGES_PER_FRAME: usize = 64;

/// One top-level thing the user dropped or picked.
pub enum SubmissionItem {
    /// A loose file (or a file from a directory-aware picker that already
    /// carries its relative path).
    File(RawFileDescriptor),
    /// A directory to be walked.
    Directory(Box<dyn DirectoryHandle>),
}

impl SubmissionItem {
    /// Describe a filesystem path: directories are walked, files are loose.
    pub fn from_path(path: &Path, config: &IngestConfig) -> Result<Self> {
        if path.is_dir() {
            Ok(Self::Directory(Box::new(FsDirectory::open(path, config))))
        } else {
            walker::describe_file(path).map(Self::File)
        }
    }

    /// Name of the root entry this item would produce.
    pub fn root_name(&self) -> &str {
        match self {
            Self::File(desc) if desc.relative_path.is_empty() => desc.name.as_str(),
            Self::File(desc) => desc
                .relative_path
                .split('/')
                .next()
                .unwrap_or_default(),
            Self::Directory(handle) => handle.name(),
        }
    }
}

impl std::fmt::Debug for SubmissionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(desc) => f.debug_tuple("File").field(&desc.name).finish(),
            Self::Directory(handle) => f.debug_tuple("Directory").field(&handle.name()).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Ingesting,
}

/// Messages sent from the ingestion thread to the session owner.
#[derive(Debug)]
pub enum IngestProgress {
    /// Directory walking finished.
    Walked { files: usize, warnings: usize },
    /// A subtree could not be read. The round continues.
    Warning(WalkWarning),
    /// The round succeeded. `batch` is the analysed, deduplicated roots.
    Complete {
        batch: IngestionBatch,
        duplicates: Vec<String>,
        duration: Duration,
    },
    /// The round failed and nothing is merged.
    Failed(IngestError),
}

/// Result of the synchronous part of a round, before analysis.
#[derive(Debug, Default)]
pub struct PreparedBatch {
    /// Candidate roots not already selected, in submission order.
    pub candidates: IngestionBatch,
    /// Root paths dropped because they were already selected.
    pub duplicates: Vec<String>,
    pub warnings: Vec<WalkWarning>,
}

/// Walk, normalise, build and dedup one submission.
///
/// Directory read failures become warnings; malformed paths and kind
/// conflicts fail the whole submission.
pub fn prepare_batch(
    items: Vec<SubmissionItem>,
    existing_roots: &HashSet<String>,
    config: &IngestConfig,
) -> Result<PreparedBatch> {
    let mut descriptors: Vec<RawFileDescriptor> = Vec::new();
    let mut warnings: Vec<WalkWarning> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();

    for item in items {
        // Already-selected roots are skipped before any walking or reading.
        let root = item.root_name();
        if existing_roots.contains(root) {
            if !duplicates.iter().any(|d| d == root) {
                duplicates.push(root.to_string());
            }
            continue;
        }
        match item {
            SubmissionItem::File(desc) => descriptors.push(desc),
            SubmissionItem::Directory(handle) => {
                let outcome = walker::walk_directory(handle);
                descriptors.extend(outcome.descriptors);
                warnings.extend(outcome.warnings);
            }
        }
    }

    if config.read_contents {
        let failed = walker::load_contents(&mut descriptors, config.max_content_bytes);
        if failed > 0 {
            warn!("{failed} file(s) could not be read and were added without contents");
        }
    }

    let mut builder = TreeBuilder::new();
    for desc in descriptors {
        builder.insert(desc)?;
    }
    for warning in &warnings {
        builder.attach_warning(&warning.path, &warning.message);
    }

    let (candidates, late): (Vec<TreeNode>, Vec<TreeNode>) = builder
        .finish()
        .into_iter()
        .partition(|root| !existing_roots.contains(&root.path));
    for root in late {
        if !duplicates.contains(&root.path) {
            duplicates.push(root.path);
        }
    }
    if !duplicates.is_empty() {
        debug!("Skipping already-selected roots: {duplicates:?}");
    }

    Ok(PreparedBatch {
        candidates,
        duplicates,
        warnings,
    })
}

/// Run one full round on the current thread, reporting through `tx`.
fn run_round(
    items: Vec<SubmissionItem>,
    existing_roots: HashSet<String>,
    config: &IngestConfig,
    analyzer: &dyn Analyzer,
    tx: &Sender<IngestProgress>,
) -> Result<(IngestionBatch, Vec<String>)> {
    let prepared = prepare_batch(items, &existing_roots, config)?;

    let files: usize = prepared
        .candidates
        .iter()
        .map(|root| root.file_count() as usize)
        .sum();
    let _ = tx.send(IngestProgress::Walked {
        files,
        warnings: prepared.warnings.len(),
    });
    for warning in prepared.warnings {
        let _ = tx.send(IngestProgress::Warning(warning));
    }

    if prepared.candidates.is_empty() {
        return Ok((Vec::new(), prepared.duplicates));
    }

    let shape = TreeShape::of(&prepared.candidates);
    let enriched = analyzer.analyze(prepared.candidates).map_err(|e| match e {
        IngestError::AnalysisFailure(_) => e,
        other => IngestError::AnalysisFailure(other.to_string()),
    })?;
    shape.check(&enriched)?;
    Ok((enriched, prepared.duplicates))
}

/// Handle to a running round.
struct IngestHandle {
    progress_rx: Receiver<IngestProgress>,
    _thread: Option<thread::JoinHandle<()>>,
}

fn start_round(
    items: Vec<SubmissionItem>,
    existing_roots: HashSet<String>,
    config: IngestConfig,
    analyzer: Arc<dyn Analyzer>,
) -> IngestHandle {
    let (tx, progress_rx) = crossbeam_channel::bounded::<IngestProgress>(PROGRESS_CHANNEL_CAPACITY);

    let thread = thread::Builder::new()
        .name("sourcedrop-ingest".into())
        .spawn(move || {
            let start = Instant::now();
            let msg = match run_round(items, existing_roots, &config, analyzer.as_ref(), &tx) {
                Ok((batch, duplicates)) => IngestProgress::Complete {
                    batch,
                    duplicates,
                    duration: start.elapsed(),
                },
                Err(err) => IngestProgress::Failed(err),
            };
            let _ = tx.send(msg);
        })
        .expect("failed to spawn ingestion thread");

    IngestHandle {
        progress_rx,
        _thread: Some(thread),
    }
}

/// Owner of the Selection and the (at most one) in-flight round.
pub struct IngestionSession {
    config: IngestConfig,
    analyzer: Arc<dyn Analyzer>,
    selection: Vec<TreeNode>,
    phase: SessionPhase,
    handle: Option<IngestHandle>,
    last_error: Option<IngestError>,
    last_warnings: Vec<WalkWarning>,
    last_duplicates: Vec<String>,
    last_duration: Option<Duration>,
}

impl IngestionSession {
    pub fn new(config: IngestConfig, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            config,
            analyzer,
            selection: Vec::new(),
            phase: SessionPhase::Idle,
            handle: None,
            last_error: None,
            last_warnings: Vec::new(),
            last_duplicates: Vec::new(),
            last_duration: None,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ingesting(&self) -> bool {
        self.phase == SessionPhase::Ingesting
    }

    /// Accepted root entries, oldest first.
    pub fn selection(&self) -> &[TreeNode] {
        &self.selection
    }

    /// Error of the last failed round, cleared by the next `submit`.
    pub fn last_error(&self) -> Option<&IngestError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Unreadable subtrees reported by the last round.
    pub fn last_warnings(&self) -> &[WalkWarning] {
        &self.last_warnings
    }

    /// Root paths the last round skipped because they were already selected.
    pub fn last_duplicates(&self) -> &[String] {
        &self.last_duplicates
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    /// Start a round. Rejected with `SessionBusy` while one is running.
    pub fn submit(&mut self, items: Vec<SubmissionItem>) -> Result<()> {
        if self.phase == SessionPhase::Ingesting {
            return Err(IngestError::SessionBusy);
        }
        info!("Ingesting {} item(s)", items.len());

        self.phase = SessionPhase::Ingesting;
        self.last_error = None;
        self.last_warnings.clear();
        self.last_duplicates.clear();
        self.last_duration = None;

        let existing: HashSet<String> = self.selection.iter().map(|n| n.path.clone()).collect();
        self.handle = Some(start_round(
            items,
            existing,
            self.config.clone(),
            self.analyzer.clone(),
        ));
        Ok(())
    }

    /// Remove the root entry at `path`. No-op if absent. Allowed at any
    /// time; does not touch an in-flight round.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.selection.len();
        self.selection.retain(|n| n.path != path);
        let removed = self.selection.len() != before;
        if removed {
            debug!("Removed {path} from selection");
        }
        removed
    }

    /// Remove the root entry at a list index, as shown in the UI.
    pub fn remove_at(&mut self, index: usize) -> Option<TreeNode> {
        (index < self.selection.len()).then(|| self.selection.remove(index))
    }

    /// Apply pending progress messages without blocking.
    ///
    /// Returns `true` if anything changed and the UI should repaint.
    pub fn process_messages(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_MESSAGES_PER_FRAME {
            let next = match &self.handle {
                Some(h) => h.progress_rx.try_recv(),
                None => break,
            };
            match next {
                Ok(msg) => {
                    self.apply(msg);
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_lost();
                    changed = true;
                    break;
                }
            }
        }
        changed
    }

    /// Block until the running round finishes or `timeout` passes.
    ///
    /// Returns `true` once the session is idle.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.phase == SessionPhase::Ingesting {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let next = match &self.handle {
                Some(h) => h.progress_rx.recv_timeout(remaining),
                None => break,
            };
            match next {
                Ok(msg) => self.apply(msg),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
            }
        }
        true
    }

    /// Submit and wait. Returns how many roots were added.
    ///
    /// On `TimedOut` the round is still running and the session stays
    /// `Ingesting`; keep calling `process_messages` or `wait_until_idle`.
    pub fn ingest_blocking(&mut self, items: Vec<SubmissionItem>, timeout: Duration) -> Result<usize> {
        let before = self.selection.len();
        self.submit(items)?;
        if !self.wait_until_idle(timeout) {
            return Err(IngestError::TimedOut(timeout));
        }
        match &self.last_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.selection.len() - before),
        }
    }

    fn apply(&mut self, msg: IngestProgress) {
        match msg {
            IngestProgress::Walked { files, warnings } => {
                debug!("Walked {files} file(s), {warnings} warning(s)");
            }
            IngestProgress::Warning(warning) => {
                self.last_warnings.push(warning);
            }
            IngestProgress::Complete {
                batch,
                duplicates,
                duration,
            } => {
                let mut added = 0usize;
                for root in batch {
                    if self.selection.iter().any(|n| n.path == root.path) {
                        debug!("{} was selected while ingesting, skipping", root.path);
                        continue;
                    }
                    self.selection.push(root);
                    added += 1;
                }
                info!(
                    "Ingestion complete: {added} root(s) added, {} duplicate(s) in {duration:?}",
                    duplicates.len()
                );
                self.last_duplicates = duplicates;
                self.last_duration = Some(duration);
                self.finish_round();
            }
            IngestProgress::Failed(err) => {
                warn!("Ingestion failed: {err}");
                self.last_error = Some(err);
                self.finish_round();
            }
        }
    }

    fn worker_lost(&mut self) {
        if self.phase == SessionPhase::Ingesting {
            warn!("Ingestion worker stopped without reporting a result");
            self.last_error = Some(IngestError::AnalysisFailure(
                "ingestion stopped unexpectedly".to_string(),
            ));
        }
        self.finish_round();
    }

    fn finish_round(&mut self) {
        self.phase = SessionPhase::Idle;
        self.handle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LocalAnalyzer;
    use crate::ingest::walker::MemoryDirectory;
    use parking_lot::Mutex;

    const WAIT: Duration = Duration::from_secs(10);

    fn session() -> IngestionSession {
        IngestionSession::new(IngestConfig::default(), Arc::new(LocalAnalyzer))
    }

    fn loose(name: &str, size: usize) -> SubmissionItem {
        SubmissionItem::File(RawFileDescriptor::loose(name, 0).with_contents(vec![b'x'; size]))
    }

    fn proj() -> SubmissionItem {
        SubmissionItem::Directory(Box::new(
            MemoryDirectory::new("proj")
                .dir(MemoryDirectory::new("src").file("x.js", b"let x;"))
                .file("readme.md", b"# proj"),
        ))
    }

    fn paths(session: &IngestionSession) -> Vec<&str> {
        session.selection().iter().map(|n| n.path.as_str()).collect()
    }

    /// Blocks inside `analyze` until released.
    struct GatedAnalyzer {
        gate: Mutex<()>,
    }

    impl Analyzer for GatedAnalyzer {
        fn analyze(&self, batch: IngestionBatch) -> Result<IngestionBatch> {
            let _open = self.gate.lock();
            Ok(batch)
        }
    }

    struct FailingAnalyzer;

    impl Analyzer for FailingAnalyzer {
        fn analyze(&self, _batch: IngestionBatch) -> Result<IngestionBatch> {
            Err(IngestError::AnalysisFailure("service timed out".into()))
        }
    }

    /// Returns a node that was never submitted.
    struct InventingAnalyzer;

    impl Analyzer for InventingAnalyzer {
        fn analyze(&self, mut batch: IngestionBatch) -> Result<IngestionBatch> {
            let ts = batch[0].last_modified;
            batch.push(TreeNode::new_dir("extra".into(), "extra".into(), ts));
            Ok(batch)
        }
    }

    /// Turns the first root into an empty directory with another name.
    struct RetypingAnalyzer;

    impl Analyzer for RetypingAnalyzer {
        fn analyze(&self, mut batch: IngestionBatch) -> Result<IngestionBatch> {
            let (path, ts) = (batch[0].path.clone(), batch[0].last_modified);
            batch[0] = TreeNode::new_dir("renamed".into(), path, ts);
            Ok(batch)
        }
    }

    #[test]
    fn test_loose_files_scenario() {
        let mut s = session();
        let added = s
            .ingest_blocking(vec![loose("a.txt", 10), loose("b.txt", 20)], WAIT)
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(paths(&s), vec!["a.txt", "b.txt"]);
        assert_eq!(s.selection()[0].size(), 10);
        assert_eq!(s.selection()[1].size(), 20);
        assert!(s.selection().iter().all(|n| !n.is_dir() && n.details.is_some()));
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_directory_scenario_and_resubmit() {
        let mut s = session();
        s.ingest_blocking(vec![proj()], WAIT).unwrap();
        let root = &s.selection()[0];
        assert_eq!(root.path, "proj");
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].path, "proj/src");
        assert_eq!(root.children()[0].children()[0].path, "proj/src/x.js");
        assert_eq!(root.children()[1].path, "proj/readme.md");

        let added = s.ingest_blocking(vec![proj()], WAIT).unwrap();
        assert_eq!(added, 0);
        assert_eq!(paths(&s), vec!["proj"]);
        assert_eq!(s.last_duplicates(), ["proj".to_string()]);
    }

    #[test]
    fn test_remove_by_path() {
        let mut s = session();
        s.ingest_blocking(vec![loose("a.txt", 10), loose("b.txt", 20)], WAIT)
            .unwrap();
        s.ingest_blocking(vec![proj()], WAIT).unwrap();

        assert!(s.remove("a.txt"));
        assert_eq!(paths(&s), vec!["b.txt", "proj"]);
        assert!(!s.remove("a.txt"));
        assert!(!s.remove("proj/readme.md"));
        assert_eq!(s.remove_at(5), None);
        assert_eq!(s.remove_at(0).map(|n| n.path), Some("b.txt".to_string()));
    }

    #[test]
    fn test_submit_while_ingesting_is_rejected() {
        let analyzer = Arc::new(GatedAnalyzer {
            gate: Mutex::new(()),
        });
        let guard = analyzer.gate.lock();
        let mut s = IngestionSession::new(IngestConfig::default(), analyzer.clone());

        s.submit(vec![loose("a.txt", 1)]).unwrap();
        assert!(s.is_ingesting());
        assert_eq!(s.submit(vec![loose("b.txt", 1)]), Err(IngestError::SessionBusy));

        // Removal is allowed mid-round and leaves the round alone.
        assert!(!s.remove("a.txt"));

        drop(guard);
        assert!(s.wait_until_idle(WAIT));
        assert_eq!(paths(&s), vec!["a.txt"]);
    }

    #[test]
    fn test_analysis_failure_discards_batch() {
        let mut failing = IngestionSession::new(IngestConfig::default(), Arc::new(FailingAnalyzer));
        failing.submit(vec![loose("a.txt", 1)]).unwrap();
        assert!(failing.wait_until_idle(WAIT));
        assert!(failing.selection().is_empty());
        assert_eq!(
            failing.last_error(),
            Some(&IngestError::AnalysisFailure("service timed out".into()))
        );
        assert_eq!(failing.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_build_failure_leaves_selection_unchanged() {
        let mut s = session();
        s.ingest_blocking(vec![loose("keep.txt", 1)], WAIT).unwrap();

        let bad = vec![
            loose("ok.txt", 1),
            SubmissionItem::File(RawFileDescriptor::nested("d//x", 1)),
        ];
        assert!(s.ingest_blocking(bad, WAIT).is_err());
        assert_eq!(paths(&s), vec!["keep.txt"]);
        assert!(matches!(s.last_error(), Some(IngestError::MalformedPath { .. })));

        let conflict = vec![
            SubmissionItem::File(RawFileDescriptor::nested("d/a", 1)),
            SubmissionItem::File(RawFileDescriptor::nested("d/a/b", 1)),
        ];
        assert!(matches!(
            s.ingest_blocking(conflict, WAIT),
            Err(IngestError::PathKindConflict { .. })
        ));
        assert_eq!(paths(&s), vec!["keep.txt"]);

        // The next good round clears the error.
        s.ingest_blocking(vec![loose("new.txt", 1)], WAIT).unwrap();
        assert!(s.last_error().is_none());
    }

    #[test]
    fn test_analyzer_inventing_paths_is_rejected() {
        let mut s = IngestionSession::new(IngestConfig::default(), Arc::new(InventingAnalyzer));
        assert!(s.ingest_blocking(vec![loose("a.txt", 1)], WAIT).is_err());
        assert!(s.selection().is_empty());
        assert!(s
            .last_error()
            .unwrap()
            .to_string()
            .contains("unexpected path 'extra'"));
    }

    #[test]
    fn test_analyzer_changing_node_shape_is_rejected() {
        let mut s = IngestionSession::new(IngestConfig::default(), Arc::new(RetypingAnalyzer));
        let err = s.ingest_blocking(vec![loose("a.txt", 10)], WAIT).unwrap_err();
        assert!(matches!(err, IngestError::AnalysisFailure(_)));
        assert!(err.to_string().contains("renamed 'a.txt'"), "{err}");
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_selected_directory_is_not_walked_again() {
        let mut s = session();
        s.ingest_blocking(vec![proj()], WAIT).unwrap();

        // A handle that would fail on its first read: skipping it before
        // the walk means no warning is raised.
        let again = MemoryDirectory::new("proj").failing_after(0, "should not be read");
        let added = s
            .ingest_blocking(
                vec![SubmissionItem::Directory(Box::new(again)), loose("proj", 1)],
                WAIT,
            )
            .unwrap();
        assert_eq!(added, 0);
        assert!(s.last_warnings().is_empty());
        assert_eq!(s.last_duplicates(), ["proj".to_string()]);
    }

    #[test]
    fn test_blocking_timeout_leaves_round_running() {
        let analyzer = Arc::new(GatedAnalyzer {
            gate: Mutex::new(()),
        });
        let guard = analyzer.gate.lock();
        let mut s = IngestionSession::new(IngestConfig::default(), analyzer.clone());

        let short = Duration::from_millis(50);
        assert_eq!(
            s.ingest_blocking(vec![loose("a.txt", 1)], short),
            Err(IngestError::TimedOut(short))
        );
        assert!(s.is_ingesting());

        drop(guard);
        assert!(s.wait_until_idle(WAIT));
        assert_eq!(paths(&s), vec!["a.txt"]);
        assert!(s.last_error().is_none());
    }

    #[test]
    fn test_unreadable_subtree_is_a_warning() {
        let dir = MemoryDirectory::new("r")
            .file("ok.txt", b"1")
            .dir(MemoryDirectory::new("locked").failing_after(0, "access denied"));
        let mut s = session();
        s.ingest_blocking(vec![SubmissionItem::Directory(Box::new(dir))], WAIT)
            .unwrap();

        assert_eq!(s.last_warnings().len(), 1);
        let root = &s.selection()[0];
        assert_eq!(root.children().len(), 2);
        let locked = root.find("r/locked").unwrap();
        assert!(locked.is_dir());
        assert!(locked.children().is_empty());
        assert!(locked.warning().unwrap().contains("access denied"));
    }

    #[test]
    fn test_prepare_batch_dedups_against_existing() {
        let existing: HashSet<String> = ["a.txt".to_string()].into_iter().collect();
        let prepared = prepare_batch(
            vec![loose("a.txt", 1), loose("c.txt", 1)],
            &existing,
            &IngestConfig::default(),
        )
        .unwrap();
        let got: Vec<&str> = prepared.candidates.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(got, vec!["c.txt"]);
        assert_eq!(prepared.duplicates, vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_empty_submission_completes() {
        let mut s = session();
        assert_eq!(s.ingest_blocking(Vec::new(), WAIT).unwrap(), 0);
        assert_eq!(s.phase(), SessionPhase::Idle);
    }
}
