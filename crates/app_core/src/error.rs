//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Preview task failed: {0}")]
    Task(String),

    // ===== Fatal Errors (application termination) =====
    #[error("System resource exhaustion: {0}")]
    SystemResource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::FileNotFound(_)
                | AppError::AccessDenied(_)
                | AppError::Extraction(_)
                | AppError::Encoding(_)
                | AppError::Task(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileNotFound(path) => format!("File not found: {}", path),
            AppError::AccessDenied(path) => format!("Access denied: {}", path),
            AppError::Extraction(msg) => format!("Could not extract document text: {}", msg),
            AppError::Task(_) => "Failed to load file content".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::FileNotFound(p),
            app_fs::FsError::AccessDenied(p) => AppError::AccessDenied(p),
            app_fs::FsError::Archive(msg) => AppError::Extraction(msg),
            app_fs::FsError::Encoding(msg) => AppError::Encoding(msg),
            app_fs::FsError::Io(io) => AppError::Io(io),
            app_fs::FsError::InvalidPath(p) => AppError::FileNotFound(p),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Task(e.to_string())
    }
}
