//! File intake: pickers, folders and drops become file records

use crate::config::IntakeConfig;
use crate::error::AppError;
use crate::file_record::{FileId, FileRecord, FileType, RawHandle};
use app_fs::{collect_files, CollectOptions};
use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, TryRecvError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One file selected by the user, before it becomes a record
#[derive(Debug, Clone)]
pub struct IntakeSource {
    name: String,
    size: u64,
    handle: RawHandle,
}

impl IntakeSource {
    /// A file on disk
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::FileNotFound(path.display().to_string()),
            std::io::ErrorKind::PermissionDenied => {
                AppError::AccessDenied(path.display().to_string())
            }
            _ => AppError::Io(e),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            handle: RawHandle::File(path.to_path_buf()),
        })
    }

    /// Content that arrived without a path (e.g. a drop carrying bytes)
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            handle: RawHandle::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Folder flattening and retention settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOptions {
    pub recursive: bool,
    pub show_hidden: bool,
    /// Keep a content handle for types the viewer can show
    pub retain_raw_data: bool,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self::from(&IntakeConfig::default())
    }
}

impl From<&IntakeConfig> for IntakeOptions {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            recursive: config.recursive_folders,
            show_hidden: config.show_hidden,
            retain_raw_data: config.retain_raw_data,
        }
    }
}

impl IntakeOptions {
    fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            recursive: self.recursive,
            show_hidden: self.show_hidden,
        }
    }
}

/// Progress of a running scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeProgress {
    pub processed: usize,
    pub total: usize,
    pub current: String,
}

impl IntakeProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f32 / self.total as f32
        }
    }
}

/// One item of an upload selection
#[derive(Debug, Clone)]
pub enum IntakeInput {
    /// A file or folder on disk
    Path(PathBuf),
    /// Content that arrived without a path
    Source(IntakeSource),
}

impl IntakeInput {
    fn label(&self) -> String {
        match self {
            IntakeInput::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            IntakeInput::Source(source) => source.name.clone(),
        }
    }
}

impl From<PathBuf> for IntakeInput {
    fn from(path: PathBuf) -> Self {
        IntakeInput::Path(path)
    }
}

impl From<IntakeSource> for IntakeInput {
    fn from(source: IntakeSource) -> Self {
        IntakeInput::Source(source)
    }
}

enum Pending {
    /// Selected directly; failing to read it fails the scan
    Root(PathBuf),
    /// Found inside a selected folder; skipped when unreadable
    Nested(PathBuf),
    Ready(IntakeSource),
}

/// Turn selected paths into intake sources
///
/// Files are taken as they are; folders are flattened. Input order is kept.
/// A path that does not exist fails the whole scan, while unreadable entries
/// inside a folder are skipped.
pub fn scan_paths<F>(
    paths: &[PathBuf],
    options: &IntakeOptions,
    on_progress: F,
) -> Result<Vec<IntakeSource>, AppError>
where
    F: FnMut(&IntakeProgress),
{
    let inputs: Vec<IntakeInput> = paths.iter().cloned().map(IntakeInput::Path).collect();
    scan_inputs(&inputs, options, on_progress)
}

/// Like [`scan_paths`], for a selection mixing paths and in-memory content
pub fn scan_inputs<F>(
    inputs: &[IntakeInput],
    options: &IntakeOptions,
    mut on_progress: F,
) -> Result<Vec<IntakeSource>, AppError>
where
    F: FnMut(&IntakeProgress),
{
    let mut pending = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input {
            IntakeInput::Path(path) if path.is_dir() => {
                let entries = collect_files(path, &options.collect_options())?;
                pending.extend(entries.into_iter().map(|e| Pending::Nested(e.path)));
            }
            IntakeInput::Path(path) => pending.push(Pending::Root(path.clone())),
            IntakeInput::Source(source) => pending.push(Pending::Ready(source.clone())),
        }
    }

    let total = pending.len();
    let mut sources = Vec::with_capacity(total);
    for (i, item) in pending.into_iter().enumerate() {
        let source = match item {
            Pending::Ready(source) => source,
            Pending::Root(path) => IntakeSource::from_path(&path)?,
            Pending::Nested(path) => match IntakeSource::from_path(&path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    continue;
                }
            },
        };
        on_progress(&IntakeProgress {
            processed: i + 1,
            total,
            current: source.name.clone(),
        });
        sources.push(source);
    }

    tracing::debug!("Scanned {} inputs into {} files", inputs.len(), sources.len());
    Ok(sources)
}

/// Hands out batch stamps for file ids
///
/// A stamp is the intake time in milliseconds, bumped past the previous
/// stamp so that two batches in the same millisecond never share ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_stamp: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_batch(&mut self, now: DateTime<Utc>) -> i64 {
        let millis = now.timestamp_millis();
        let stamp = match self.last_stamp {
            Some(last) => millis.max(last + 1),
            None => millis,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// Build the records for one batch
pub(crate) fn build_records(
    sources: Vec<IntakeSource>,
    stamp: i64,
    now: DateTime<Utc>,
    retain_raw_data: bool,
) -> Vec<FileRecord> {
    sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            let id = FileId::new(stamp, index);
            let keep = retain_raw_data
                && FileType::from_name(&source.name).is_previewable();
            let raw = keep.then_some(source.handle);
            FileRecord::new(id, source.name, source.size, now, raw)
        })
        .collect()
}

/// Message from a background scan
#[derive(Debug)]
pub enum IntakeEvent {
    Progress(IntakeProgress),
    Finished(Vec<IntakeSource>),
    Failed(AppError),
}

/// A folder or file selection being scanned on the blocking pool
pub struct IntakeJob {
    label: String,
    rx: Receiver<IntakeEvent>,
    progress: Option<IntakeProgress>,
    finished: bool,
}

impl IntakeJob {
    /// Start scanning `paths` on the runtime's blocking pool
    pub fn spawn(handle: &tokio::runtime::Handle, paths: Vec<PathBuf>, options: IntakeOptions) -> Self {
        let inputs = paths.into_iter().map(IntakeInput::Path).collect();
        Self::spawn_inputs(handle, inputs, options)
    }

    /// Start scanning a mixed selection as one batch, keeping its order
    pub fn spawn_inputs(
        handle: &tokio::runtime::Handle,
        inputs: Vec<IntakeInput>,
        options: IntakeOptions,
    ) -> Self {
        let label = match inputs.as_slice() {
            [single] => single.label(),
            many => format!("{} items", many.len()),
        };

        let (tx, rx) = crossbeam_channel::unbounded();
        handle.spawn_blocking(move || {
            let progress_tx = tx.clone();
            let result = scan_inputs(&inputs, &options, |p| {
                let _ = progress_tx.send(IntakeEvent::Progress(p.clone()));
            });
            let event = match result {
                Ok(sources) => IntakeEvent::Finished(sources),
                Err(e) => IntakeEvent::Failed(e),
            };
            // The receiver is gone when the window closed mid-scan
            let _ = tx.send(event);
        });

        tracing::info!("Intake started: {}", label);
        Self {
            label,
            rx,
            progress: None,
            finished: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn progress(&self) -> Option<&IntakeProgress> {
        self.progress.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain pending events without blocking
    ///
    /// Returns the outcome once, when the scan has ended.
    pub fn poll(&mut self) -> Option<Result<Vec<IntakeSource>, AppError>> {
        if self.finished {
            return None;
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(outcome) = self.apply(event) {
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    return Some(Err(AppError::Task(format!("intake of {} stopped", self.label))));
                }
            }
        }
    }

    /// Block until the scan has ended
    pub fn wait(&mut self) -> Result<Vec<IntakeSource>, AppError> {
        if self.finished {
            return Err(AppError::Task(format!("intake of {} already collected", self.label)));
        }
        loop {
            let event = self
                .rx
                .recv()
                .map_err(|_| AppError::Task(format!("intake of {} stopped", self.label)))?;
            if let Some(outcome) = self.apply(event) {
                return outcome;
            }
        }
    }

    fn apply(&mut self, event: IntakeEvent) -> Option<Result<Vec<IntakeSource>, AppError>> {
        match event {
            IntakeEvent::Progress(p) => {
                self.progress = Some(p);
                None
            }
            IntakeEvent::Finished(sources) => {
                tracing::info!("Intake finished: {} ({} files)", self.label, sources.len());
                self.finished = true;
                Some(Ok(sources))
            }
            IntakeEvent::Failed(e) => {
                tracing::warn!("Intake failed: {}: {}", self.label, e);
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b10.txt"), "ten").unwrap();
        fs::write(dir.path().join("b2.txt"), "two").unwrap();
        fs::write(dir.path().join("a.pdf"), "%PDF-1.4").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.csv"), "x,y").unwrap();
        dir
    }

    fn names(sources: &[IntakeSource]) -> Vec<&str> {
        sources.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_scan_flattens_folder() {
        let dir = fixture();
        let sources = scan_paths(&[dir.path().to_path_buf()], &IntakeOptions::default(), |_| {}).unwrap();
        assert_eq!(names(&sources), vec!["a.pdf", "b2.txt", "b10.txt", "c.csv"]);
        assert_eq!(sources[1].size(), 3);
    }

    #[test]
    fn test_scan_non_recursive() {
        let dir = fixture();
        let options = IntakeOptions {
            recursive: false,
            ..Default::default()
        };
        let sources = scan_paths(&[dir.path().to_path_buf()], &options, |_| {}).unwrap();
        assert_eq!(names(&sources), vec!["a.pdf", "b2.txt", "b10.txt"]);
    }

    #[test]
    fn test_scan_keeps_input_order_and_reports_progress() {
        let dir = fixture();
        let paths = vec![
            dir.path().join("sub").join("c.csv"),
            dir.path().join("a.pdf"),
        ];
        let mut seen = Vec::new();
        let sources = scan_paths(&paths, &IntakeOptions::default(), |p| seen.push(p.clone())).unwrap();

        assert_eq!(names(&sources), vec!["c.csv", "a.pdf"]);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].processed, 2);
        assert_eq!(seen[1].total, 2);
        assert_eq!(seen[1].current, "a.pdf");
    }

    #[test]
    fn test_scan_mixed_inputs_keeps_order() {
        let dir = fixture();
        let inputs = vec![
            IntakeInput::from(dir.path().join("a.pdf")),
            IntakeInput::from(IntakeSource::from_bytes("dropped.txt", &b"bytes"[..])),
            IntakeInput::from(dir.path().join("sub")),
        ];
        let mut seen = Vec::new();
        let sources = scan_inputs(&inputs, &IntakeOptions::default(), |p| seen.push(p.current.clone())).unwrap();

        assert_eq!(names(&sources), vec!["a.pdf", "dropped.txt", "c.csv"]);
        assert_eq!(seen, vec!["a.pdf", "dropped.txt", "c.csv"]);
        assert_eq!(sources[1].size(), 5);
    }

    #[test]
    fn test_scan_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_paths(&[dir.path().join("gone.pdf")], &IntakeOptions::default(), |_| {});
        assert!(matches!(result, Err(AppError::FileNotFound(_))));
    }

    #[test]
    fn test_empty_selection() {
        let sources = scan_paths(&[], &IntakeOptions::default(), |_| {}).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_id_stamps_increase() {
        let mut ids = IdGenerator::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        assert_eq!(ids.next_batch(now), 1_700_000_000_000);
        assert_eq!(ids.next_batch(now), 1_700_000_000_001);

        let earlier = Utc.timestamp_millis_opt(1_600_000_000_000).unwrap();
        assert_eq!(ids.next_batch(earlier), 1_700_000_000_002);

        let later = Utc.timestamp_millis_opt(1_800_000_000_000).unwrap();
        assert_eq!(ids.next_batch(later), 1_800_000_000_000);
    }

    #[test]
    fn test_build_records_retention() {
        let now = Utc::now();
        let sources = vec![
            IntakeSource::from_bytes("report.PDF", &b"%PDF"[..]),
            IntakeSource::from_bytes("sheet.xlsx", &b"PK"[..]),
            IntakeSource::from_bytes("notes", &b"hi"[..]),
        ];

        let records = build_records(sources.clone(), 42, now, true);
        assert_eq!(records[0].id().as_str(), "42-0");
        assert_eq!(records[2].id().as_str(), "42-2");
        assert_eq!(records[0].file_type(), FileType::Pdf);
        assert_eq!(records[2].file_type(), FileType::Other);
        assert!(records[0].raw().is_some());
        assert!(records[1].raw().is_none());
        assert!(records[2].raw().is_none());
        assert_eq!(records[1].size(), 2);

        let records = build_records(sources, 43, now, false);
        assert!(records.iter().all(|r| r.raw().is_none()));
    }

    #[test]
    fn test_job_delivers_sources() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = fixture();

        let mut job = IntakeJob::spawn(
            runtime.handle(),
            vec![dir.path().to_path_buf()],
            IntakeOptions::default(),
        );
        let sources = job.wait().unwrap();

        assert_eq!(sources.len(), 4);
        assert!(job.is_finished());
        assert_eq!(job.progress().map(|p| p.processed), Some(4));
        assert!(job.poll().is_none());
    }

    #[test]
    fn test_job_with_mixed_inputs_is_one_batch() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = fixture();

        let mut job = IntakeJob::spawn_inputs(
            runtime.handle(),
            vec![
                IntakeSource::from_bytes("first.txt", &b"1"[..]).into(),
                dir.path().join("b2.txt").into(),
            ],
            IntakeOptions::default(),
        );
        assert_eq!(job.label(), "2 items");
        let sources = job.wait().unwrap();
        assert_eq!(names(&sources), vec!["first.txt", "b2.txt"]);
    }

    #[test]
    fn test_job_reports_failure() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut job = IntakeJob::spawn(
            runtime.handle(),
            vec![dir.path().join("missing")],
            IntakeOptions::default(),
        );
        assert_eq!(job.label(), "missing");
        assert!(job.wait().is_err());
    }

    #[test]
    fn test_poll_until_finished() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = fixture();
        let mut job = IntakeJob::spawn(
            runtime.handle(),
            vec![dir.path().join("a.pdf"), dir.path().join("b2.txt")],
            IntakeOptions::default(),
        );
        assert_eq!(job.label(), "2 items");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        let outcome = loop {
            if let Some(outcome) = job.poll() {
                break outcome;
            }
            assert!(std::time::Instant::now() < deadline);
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert_eq!(names(&outcome.unwrap()), vec!["a.pdf", "b2.txt"]);
    }
}
