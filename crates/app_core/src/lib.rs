//! FileShelf Core Domain Logic
//!
//! This crate contains:
//! - File records and the in-memory catalog
//! - File intake (pickers, folders, drops)
//! - Pagination
//! - Application state
//! - Preview loading for the viewer
//! - Configuration
//! - Error types
//! - Command system

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod file_record;
pub mod format;
pub mod intake;
pub mod pager;
pub mod preview;
pub mod resource;
pub mod state;

pub use catalog::Catalog;
pub use command::{Command, CommandId};
pub use config::{AppConfig, CatalogConfig, GeneralConfig, IntakeConfig, ViewerConfig};
pub use error::AppError;
pub use file_record::{FileId, FileRecord, FileType, RawHandle};
pub use format::{format_date, format_file_size};
pub use intake::{
    scan_inputs, scan_paths, IdGenerator, IntakeEvent, IntakeInput, IntakeJob, IntakeOptions,
    IntakeProgress, IntakeSource,
};
pub use pager::{visible_window, ItemsPerPage, PageLink, PageSummary, Pager};
pub use preview::{
    DefaultPreviewLoader, DocumentExtractor, DocxExtractor, PdfPreview, PreviewContent,
    PreviewLoader, TextPreview, Viewer, ViewerState,
};
pub use resource::{ResourceManager, ResourceStats, Scoped};
pub use state::AppState;
