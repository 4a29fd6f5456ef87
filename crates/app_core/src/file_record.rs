//! File records held by the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque identifier assigned at intake; never reused within a process
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub(crate) fn new(batch_stamp: i64, index: usize) -> Self {
        Self(format!("{}-{}", batch_stamp, index))
    }

    /// Wrap an existing id string (e.g. the demo records)
    pub fn from_raw(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of file kinds the shelf knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Txt,
    Xls,
    Xlsx,
    Ppt,
    Pptx,
    Csv,
    Other,
}

impl FileType {
    pub const ALL: [FileType; 10] = [
        FileType::Pdf,
        FileType::Doc,
        FileType::Docx,
        FileType::Txt,
        FileType::Xls,
        FileType::Xlsx,
        FileType::Ppt,
        FileType::Pptx,
        FileType::Csv,
        FileType::Other,
    ];

    /// Infer the type from the text after the final `.` of a file name
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => FileType::Other,
        }
    }

    /// Map an extension (without the dot, any case)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "doc" => FileType::Doc,
            "docx" => FileType::Docx,
            "txt" => FileType::Txt,
            "xls" => FileType::Xls,
            "xlsx" => FileType::Xlsx,
            "ppt" => FileType::Ppt,
            "pptx" => FileType::Pptx,
            "csv" => FileType::Csv,
            _ => FileType::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Doc => "DOC",
            FileType::Docx => "DOCX",
            FileType::Txt => "TXT",
            FileType::Xls => "XLS",
            FileType::Xlsx => "XLSX",
            FileType::Ppt => "PPT",
            FileType::Pptx => "PPTX",
            FileType::Csv => "CSV",
            FileType::Other => "OTHER",
        }
    }

    /// Canonical extension, empty for `Other`
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Doc => "doc",
            FileType::Docx => "docx",
            FileType::Txt => "txt",
            FileType::Xls => "xls",
            FileType::Xlsx => "xlsx",
            FileType::Ppt => "ppt",
            FileType::Pptx => "pptx",
            FileType::Csv => "csv",
            FileType::Other => "",
        }
    }

    /// Can the viewer show the content of this type?
    pub fn is_previewable(self) -> bool {
        matches!(self, FileType::Pdf | FileType::Txt | FileType::Docx)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Handle to the content of an uploaded file
///
/// Either the file on disk the user picked, or the bytes that came with a drop.
#[derive(Clone)]
pub enum RawHandle {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl RawHandle {
    /// Read the full content
    pub async fn read(&self) -> std::io::Result<Arc<[u8]>> {
        match self {
            RawHandle::File(path) => Ok(Arc::from(tokio::fs::read(path).await?)),
            RawHandle::Memory(bytes) => Ok(Arc::clone(bytes)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            RawHandle::File(path) => Some(path),
            RawHandle::Memory(_) => None,
        }
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawHandle::File(path) => f.debug_tuple("File").field(path).finish(),
            RawHandle::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// One uploaded file
///
/// Created by intake and never modified afterwards.
#[derive(Debug, Clone)]
pub struct FileRecord {
    id: FileId,
    name: String,
    file_type: FileType,
    size: u64,
    upload_date: DateTime<Utc>,
    raw: Option<RawHandle>,
}

impl FileRecord {
    pub(crate) fn new(
        id: FileId,
        name: String,
        size: u64,
        upload_date: DateTime<Utc>,
        raw: Option<RawHandle>,
    ) -> Self {
        let file_type = FileType::from_name(&name);
        Self {
            id,
            name,
            file_type,
            size,
            upload_date,
            raw,
        }
    }

    pub fn id(&self) -> &FileId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn upload_date(&self) -> DateTime<Utc> {
        self.upload_date
    }

    pub fn raw(&self) -> Option<&RawHandle> {
        self.raw.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_is_case_insensitive() {
        assert_eq!(FileType::from_name("report.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_name("Budget.XlSx"), FileType::Xlsx);
        assert_eq!(FileType::from_name("data.csv"), FileType::Csv);
    }

    #[test]
    fn test_type_uses_final_extension() {
        assert_eq!(FileType::from_name("archive.pdf.txt"), FileType::Txt);
        assert_eq!(FileType::from_name("notes"), FileType::Other);
        assert_eq!(FileType::from_name("trailing."), FileType::Other);
        assert_eq!(FileType::from_name("image.png"), FileType::Other);
        assert_eq!(FileType::from_name(".docx"), FileType::Docx);
    }

    #[test]
    fn test_labels_round_trip() {
        for ty in FileType::ALL {
            if ty != FileType::Other {
                assert_eq!(FileType::from_extension(ty.label()), ty);
            }
        }
    }

    #[test]
    fn test_previewable_types() {
        let previewable: Vec<_> = FileType::ALL.into_iter().filter(|t| t.is_previewable()).collect();
        assert_eq!(previewable, vec![FileType::Pdf, FileType::Docx, FileType::Txt]);
    }

    #[tokio::test]
    async fn test_raw_handle_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"on disk").unwrap();

        let file = RawHandle::File(path);
        assert_eq!(&*file.read().await.unwrap(), b"on disk");

        let memory = RawHandle::Memory(Arc::from(&b"in memory"[..]));
        assert_eq!(&*memory.read().await.unwrap(), b"in memory");
        assert!(memory.path().is_none());
    }
}
