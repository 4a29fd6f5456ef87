//! In-memory catalog of uploaded files

use crate::file_record::{FileId, FileRecord};

/// Ordered list of file records, insertion order, no gaps
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FileRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch at the end, keeping its order
    pub fn append(&mut self, batch: Vec<FileRecord>) {
        if batch.is_empty() {
            return;
        }
        tracing::debug!("Catalog append: {} records", batch.len());
        self.records.extend(batch);
    }

    /// Remove the record with `id`; an unknown id leaves the catalog untouched
    pub fn remove(&mut self, id: &FileId) -> Option<FileRecord> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(index))
    }

    pub fn get(&self, id: &FileId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
