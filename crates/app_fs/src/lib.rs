//! FileShelf File System Layer
//!
//! Provides the file-facing pieces the shelf needs, including:
//! - Folder flattening for folder uploads and dropped directories
//! - Encoding detection and conversion for text previews
//! - DOCX text extraction
//! - Scratch documents handed to the system viewer

mod browser;
mod docx;
mod encoding;
mod scratch;

pub use browser::{collect_files, natural_cmp, CollectOptions, FileEntry};
pub use docx::extract_docx_text;
pub use encoding::{decode_text, detect_encoding, system_encoding_hint, DecodedText, EncodingHint};
pub use scratch::ScratchFile;

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
