//! File viewer: asynchronous preview loading
//!
//! Opening a file starts a load on the tokio runtime. The UI thread calls
//! [`Viewer::poll`] every frame to pick up the result; nothing here blocks.
//! Every load carries a ticket, and a result whose ticket is no longer
//! current is dropped, which also releases any scratch document it holds.
//! The current ticket is shared with the load tasks behind a lock, so a task
//! either delivers before a close drains the channel or drops its own result.

use crate::config::ViewerConfig;
use crate::error::AppError;
use crate::file_record::{FileRecord, FileType};
use crate::resource::{ResourceManager, Scoped};
use app_fs::{EncodingHint, ScratchFile};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Preview of a PDF, handed to the system viewer
#[derive(Debug)]
pub struct PdfPreview {
    document: Scoped<ScratchFile>,
}

impl PdfPreview {
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn len(&self) -> u64 {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Open the scratch copy in the system's default PDF viewer
    pub fn open_external(&self) -> Result<(), AppError> {
        self.document.open_external()?;
        Ok(())
    }
}

/// Decoded text content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreview {
    pub text: String,
    /// Encoding the bytes were decoded with; `None` for extracted documents
    pub encoding: Option<&'static str>,
    /// The text was cut at the configured limit
    pub truncated: bool,
}

/// What the viewer shows for a loaded file
#[derive(Debug)]
pub enum PreviewContent {
    Pdf(PdfPreview),
    Text(TextPreview),
    /// Plain text extracted from a DOCX document
    Document(TextPreview),
    /// No preview for this type
    Unsupported {
        file_type: FileType,
        name: String,
        size: u64,
    },
    /// The content handle was not kept at intake
    MissingData,
}

/// Viewer state machine
#[derive(Debug, Default)]
pub enum ViewerState {
    #[default]
    Idle,
    Loading {
        file: FileRecord,
    },
    Displaying {
        file: FileRecord,
        content: PreviewContent,
    },
    Errored {
        file: FileRecord,
        message: String,
    },
}

impl ViewerState {
    /// The file the viewer is showing, if open
    pub fn file(&self) -> Option<&FileRecord> {
        match self {
            ViewerState::Idle => None,
            ViewerState::Loading { file }
            | ViewerState::Displaying { file, .. }
            | ViewerState::Errored { file, .. } => Some(file),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ViewerState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewerState::Loading { .. })
    }

    pub fn content(&self) -> Option<&PreviewContent> {
        match self {
            ViewerState::Displaying { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewerState::Errored { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Turns document bytes into plain text
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, AppError>;
}

/// DOCX body text through `app_fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocumentExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, AppError> {
        Ok(app_fs::extract_docx_text(bytes)?)
    }
}

/// Produces the preview content of one file
#[async_trait]
pub trait PreviewLoader: Send + Sync {
    async fn load(&self, file: FileRecord) -> Result<PreviewContent, AppError>;
}

/// Loader used by the application
pub struct DefaultPreviewLoader {
    latency: Duration,
    max_chars: usize,
    encoding_hint: EncodingHint,
    extractor: Arc<dyn DocumentExtractor>,
    resources: ResourceManager,
}

impl DefaultPreviewLoader {
    pub fn new(config: &ViewerConfig, resources: ResourceManager) -> Self {
        Self {
            latency: config.latency(),
            max_chars: config.max_preview_chars,
            encoding_hint: app_fs::system_encoding_hint(),
            extractor: Arc::new(DocxExtractor),
            resources,
        }
    }

    /// Replace the DOCX extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    async fn load_pdf(&self, file: &FileRecord, bytes: Arc<[u8]>) -> Result<PreviewContent, AppError> {
        let scratch = tokio::task::spawn_blocking(move || ScratchFile::with_contents(&bytes, "pdf")).await??;
        let document = self.resources.acquire(file.name(), scratch);
        Ok(PreviewContent::Pdf(PdfPreview { document }))
    }

    async fn load_text(&self, bytes: Arc<[u8]>) -> Result<PreviewContent, AppError> {
        let hint = self.encoding_hint;
        let max_chars = self.max_chars;
        let preview = tokio::task::spawn_blocking(move || {
            let decoded = app_fs::decode_text(&bytes, hint);
            let (text, truncated) = truncate_chars(decoded.text, max_chars);
            TextPreview {
                text,
                encoding: Some(decoded.encoding),
                truncated,
            }
        })
        .await?;
        Ok(PreviewContent::Text(preview))
    }

    async fn load_document(&self, bytes: Arc<[u8]>) -> Result<PreviewContent, AppError> {
        let extractor = Arc::clone(&self.extractor);
        let max_chars = self.max_chars;
        let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes)).await??;
        let (text, truncated) = truncate_chars(text, max_chars);
        Ok(PreviewContent::Document(TextPreview {
            text,
            encoding: None,
            truncated,
        }))
    }
}

#[async_trait]
impl PreviewLoader for DefaultPreviewLoader {
    async fn load(&self, file: FileRecord) -> Result<PreviewContent, AppError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let file_type = file.file_type();
        if !file_type.is_previewable() {
            return Ok(PreviewContent::Unsupported {
                file_type,
                name: file.name().to_string(),
                size: file.size(),
            });
        }

        let Some(raw) = file.raw() else {
            return Ok(PreviewContent::MissingData);
        };
        let bytes = raw.read().await?;

        match file_type {
            FileType::Pdf => self.load_pdf(&file, bytes).await,
            FileType::Txt => self.load_text(bytes).await,
            FileType::Docx => self.load_document(bytes).await,
            _ => Ok(PreviewContent::MissingData),
        }
    }
}

fn truncate_chars(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            text.truncate(cut);
            (text, true)
        }
        None => (text, false),
    }
}

type LoadResult = (u64, Result<PreviewContent, AppError>);

/// Owns the viewer state and the load in flight
pub struct Viewer {
    loader: Arc<dyn PreviewLoader>,
    runtime: tokio::runtime::Handle,
    state: ViewerState,
    ticket: Arc<Mutex<u64>>,
    task: Option<JoinHandle<()>>,
    /// Aborted loads that have not wound down yet
    cancelled: Vec<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<LoadResult>,
    rx: mpsc::UnboundedReceiver<LoadResult>,
}

impl Viewer {
    pub fn new(runtime: tokio::runtime::Handle, loader: Arc<dyn PreviewLoader>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            loader,
            runtime,
            state: ViewerState::Idle,
            ticket: Arc::new(Mutex::new(0)),
            task: None,
            cancelled: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// A load is in flight, or an aborted one is still winding down
    pub fn is_busy(&self) -> bool {
        self.state.is_loading() || self.cancelled.iter().any(|t| !t.is_finished())
    }

    /// Start loading `file`, replacing whatever is shown
    pub fn open(&mut self, file: FileRecord) {
        let ticket = self.advance();

        tracing::debug!("Viewer loading {} (ticket {})", file.name(), ticket);
        self.state = ViewerState::Loading { file: file.clone() };

        let loader = Arc::clone(&self.loader);
        let current = Arc::clone(&self.ticket);
        let tx = self.tx.clone();
        self.task = Some(self.runtime.spawn(async move {
            let result = loader.load(file).await;
            let latest = current.lock();
            if *latest != ticket {
                tracing::trace!("Preview load {} superseded, dropping result", ticket);
                return;
            }
            // Receiver only goes away with the viewer
            let _ = tx.send((ticket, result));
        }));
    }

    /// Close the viewer, dropping any content and load in flight
    pub fn close(&mut self) {
        if self.state.is_open() {
            tracing::debug!("Viewer closed");
        }
        self.advance();
        self.state = ViewerState::Idle;
    }

    /// Apply finished loads; returns true when the state changed
    pub fn poll(&mut self) -> bool {
        self.cancelled.retain(|t| !t.is_finished());
        let mut changed = self.drain();

        if self.state.is_loading() && self.task.as_ref().is_some_and(|t| t.is_finished()) {
            // The result may have landed between the drain and the check
            changed |= self.drain();
            if self.state.is_loading() {
                self.task = None;
                self.fail(AppError::Task("preview task ended without a result".into()));
                changed = true;
            }
        }
        changed
    }

    /// Wait for the load in flight and apply its result
    pub async fn settle(&mut self) {
        for task in std::mem::take(&mut self.cancelled) {
            let _ = task.await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() && self.state.is_loading() {
                    self.fail(AppError::from(e));
                }
            }
        }
        self.drain();
    }

    fn drain(&mut self) -> bool {
        let current = *self.ticket.lock();
        let mut changed = false;
        while let Ok((ticket, result)) = self.rx.try_recv() {
            if ticket != current {
                tracing::trace!("Dropping stale preview result (ticket {})", ticket);
                continue;
            }
            changed |= self.apply(result);
        }
        changed
    }

    fn apply(&mut self, result: Result<PreviewContent, AppError>) -> bool {
        let file = match std::mem::take(&mut self.state) {
            ViewerState::Loading { file } => file,
            other => {
                self.state = other;
                return false;
            }
        };

        self.task = None;
        self.state = match result {
            Ok(content) => ViewerState::Displaying { file, content },
            Err(e) => {
                tracing::warn!("Preview of {} failed: {}", file.name(), e);
                ViewerState::Errored {
                    file,
                    message: e.user_message(),
                }
            }
        };
        true
    }

    fn fail(&mut self, error: AppError) {
        if let ViewerState::Loading { file } = std::mem::take(&mut self.state) {
            tracing::warn!("Preview of {} failed: {}", file.name(), error);
            self.state = ViewerState::Errored {
                file,
                message: error.user_message(),
            };
        }
    }

    /// Invalidate the load in flight and return the next ticket
    fn advance(&mut self) -> u64 {
        let mut current = self.ticket.lock();
        *current += 1;

        if let Some(task) = self.task.take() {
            task.abort();
            self.cancelled.push(task);
        }
        self.cancelled.retain(|t| !t.is_finished());

        // Results already delivered are stale now; dropping them releases
        // their resources
        while self.rx.try_recv().is_ok() {}
        *current
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::intake::IntakeSource;
    use crate::state::AppState;
    use chrono::Utc;
    use std::io::Write;

    struct FailingExtractor;

    impl DocumentExtractor for FailingExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String, AppError> {
            Err(AppError::Extraction("corrupt document".into()))
        }
    }

    fn config(latency_ms: u64) -> ViewerConfig {
        ViewerConfig {
            simulated_latency_ms: latency_ms,
            max_preview_chars: 16,
        }
    }

    fn viewer(latency_ms: u64, resources: &ResourceManager) -> Viewer {
        let loader = DefaultPreviewLoader::new(&config(latency_ms), resources.clone());
        Viewer::new(tokio::runtime::Handle::current(), Arc::new(loader))
    }

    fn record(name: &str, bytes: &[u8]) -> FileRecord {
        let mut state = AppState::new(AppConfig::default());
        state.ingest(vec![IntakeSource::from_bytes(name, bytes)], Utc::now());
        state.catalog().as_slice()[0].clone()
    }

    fn docx(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        write!(writer, "<w:document><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>", body).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_text_preview() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("notes.txt", b"hello shelf"));
        assert!(viewer.state().is_loading());
        viewer.settle().await;

        match viewer.state().content() {
            Some(PreviewContent::Text(text)) => {
                assert_eq!(text.text, "hello shelf");
                assert_eq!(text.encoding, Some("UTF-8"));
                assert!(!text.truncated);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_preview_is_truncated() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("long.txt", "ä".repeat(40).as_bytes()));
        viewer.settle().await;

        match viewer.state().content() {
            Some(PreviewContent::Text(text)) => {
                assert_eq!(text.text.chars().count(), 16);
                assert!(text.truncated);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_docx_preview() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("memo.docx", &docx("Quarterly memo")));
        viewer.settle().await;

        match viewer.state().content() {
            Some(PreviewContent::Document(text)) => assert_eq!(text.text, "Quarterly memo"),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extraction_failure_is_shown_inline() {
        let resources = ResourceManager::new();
        let loader = DefaultPreviewLoader::new(&config(0), resources.clone())
            .with_extractor(Arc::new(FailingExtractor));
        let mut viewer = Viewer::new(tokio::runtime::Handle::current(), Arc::new(loader));

        viewer.open(record("memo.docx", b"PK"));
        viewer.settle().await;

        assert_eq!(
            viewer.state().error(),
            Some("Could not extract document text: corrupt document")
        );
        assert_eq!(viewer.state().file().map(|f| f.name()), Some("memo.docx"));
    }

    #[tokio::test]
    async fn test_invalid_docx_errors() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("broken.docx", b"not a zip"));
        viewer.settle().await;
        assert!(matches!(viewer.state(), ViewerState::Errored { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_type() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("budget.xlsx", b"PK"));
        viewer.settle().await;

        match viewer.state().content() {
            Some(PreviewContent::Unsupported { file_type, name, size }) => {
                assert_eq!(*file_type, FileType::Xlsx);
                assert_eq!(name, "budget.xlsx");
                assert_eq!(*size, 2);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_data_placeholder() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);
        let state = AppState::with_demo_records(AppConfig::default());

        viewer.open(state.catalog().as_slice()[0].clone());
        viewer.settle().await;
        assert!(matches!(viewer.state().content(), Some(PreviewContent::MissingData)));
    }

    #[tokio::test]
    async fn test_pdf_handle_released_on_close() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("report.pdf", b"%PDF-1.4 test"));
        viewer.settle().await;

        let path = match viewer.state().content() {
            Some(PreviewContent::Pdf(pdf)) => {
                assert_eq!(pdf.len(), 13);
                pdf.path().to_path_buf()
            }
            other => panic!("unexpected content: {:?}", other),
        };
        assert!(path.exists());
        assert_eq!(resources.live(), 1);

        viewer.close();
        assert_eq!(resources.live(), 0);
        assert!(!path.exists());
        assert!(!viewer.is_open());
    }

    #[tokio::test]
    async fn test_switching_files_releases_previous() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("a.pdf", b"%PDF a"));
        viewer.settle().await;
        assert_eq!(resources.live(), 1);

        viewer.open(record("b.txt", b"second"));
        assert_eq!(resources.live(), 0);
        viewer.settle().await;

        assert_eq!(viewer.state().file().map(|f| f.name()), Some("b.txt"));
        assert!(matches!(viewer.state().content(), Some(PreviewContent::Text(_))));
    }

    #[tokio::test]
    async fn test_close_while_loading() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(50, &resources);

        viewer.open(record("slow.pdf", b"%PDF slow"));
        assert!(viewer.state().is_loading());
        viewer.close();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!viewer.poll());
        assert!(matches!(viewer.state(), ViewerState::Idle));
        assert_eq!(resources.live(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_close_racing_a_finished_load_releases_handle() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        for i in 0..200u64 {
            viewer.open(record("race.pdf", b"%PDF race"));
            assert!(viewer.is_busy());

            let spin = Duration::from_micros((i * 7) % 400);
            let start = std::time::Instant::now();
            while start.elapsed() < spin {
                std::hint::spin_loop();
            }
            viewer.close();

            for _ in 0..1000 {
                if !viewer.is_busy() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            assert!(!viewer.is_busy());
            // No poll() in between: the handle must already be gone
            assert_eq!(resources.live(), 0, "iteration {}", i);
            assert!(matches!(viewer.state(), ViewerState::Idle));
        }
    }

    #[tokio::test]
    async fn test_stale_result_is_dropped() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("first.pdf", b"%PDF first"));
        // Let the load finish without applying it
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(viewer.state().is_loading());

        viewer.open(record("second.txt", b"later"));
        assert_eq!(resources.live(), 0);
        viewer.settle().await;
        assert_eq!(viewer.state().file().map(|f| f.name()), Some("second.txt"));
    }

    #[tokio::test]
    async fn test_poll_applies_result() {
        let resources = ResourceManager::new();
        let mut viewer = viewer(0, &resources);

        viewer.open(record("note.txt", b"polled"));
        let mut applied = false;
        for _ in 0..200 {
            if viewer.poll() {
                applied = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(applied);
        assert!(viewer.state().content().is_some());
    }
}
