//! Scratch documents
//!
//! A preview that has to be shown by another program (PDF) needs its bytes on
//! disk. The file lives exactly as long as the `ScratchFile` value.

use crate::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const PREFIX: &str = "file_shelf_";

/// Temporary file removed from disk on drop
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
    len: u64,
}

impl ScratchFile {
    /// Write `bytes` into a new scratch file ending in `.{extension}`
    pub fn with_contents(bytes: &[u8], extension: &str) -> Result<Self> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut file = tempfile::Builder::new()
            .prefix(PREFIX)
            .suffix(&suffix)
            .tempfile()?;

        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!("Scratch file created: {:?} ({} bytes)", file.path(), bytes.len());

        Ok(Self {
            file,
            len: bytes.len() as u64,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hand the file to the system's default viewer
    #[cfg(feature = "open-external")]
    pub fn open_external(&self) -> Result<()> {
        open::that(self.path())?;
        tracing::info!("Opened {:?} in the system viewer", self.path());
        Ok(())
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        tracing::debug!("Scratch file released: {:?}", self.file.path());
    }
}
