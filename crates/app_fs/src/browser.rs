//! Folder flattening for uploads
//!
//! A folder upload (or a directory dropped onto the window) becomes the flat
//! list of files it contains, in a stable order.

use crate::{FsError, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// File found while flattening a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    /// Path relative to the folder that was selected
    pub relative_path: PathBuf,
    pub size: u64,
}

impl FileEntry {
    fn from_dir_entry(path: PathBuf, root: &Path, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let relative_path = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(&name));

        Self {
            path,
            name,
            relative_path,
            size,
        }
    }
}

/// Options for flattening a folder
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Descend into sub-folders
    pub recursive: bool,
    /// Include dot-files / hidden files
    pub show_hidden: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            show_hidden: false,
        }
    }
}

/// Flatten a folder into the files it contains
///
/// Entries of one folder are visited in natural name order, sub-folders after
/// the files next to them. Entries that cannot be read are skipped.
pub fn collect_files<P: AsRef<Path>>(root: P, options: &CollectOptions) -> Result<Vec<FileEntry>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(FsError::NotFound(root.display().to_string()));
    }

    if !root.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", root.display())));
    }

    let mut files = Vec::new();
    collect_into(root, root, options, &mut files)?;

    tracing::debug!("Collected {} files from {:?}", files.len(), root);
    Ok(files)
}

fn collect_into(root: &Path, dir: &Path, options: &CollectOptions, out: &mut Vec<FileEntry>) -> Result<()> {
    let read_dir = fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => FsError::AccessDenied(dir.display().to_string()),
        _ => FsError::Io(e),
    })?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if !options.show_hidden && is_hidden_file(&path, &name) {
            continue;
        }

        if metadata.is_dir() {
            dirs.push((name, path));
        } else {
            files.push((name, path, metadata.len()));
        }
    }

    files.sort_by(|a, b| natural_cmp(&a.0, &b.0));
    dirs.sort_by(|a, b| natural_cmp(&a.0, &b.0));

    out.extend(
        files
            .into_iter()
            .map(|(_, path, size)| FileEntry::from_dir_entry(path, root, size)),
    );

    if options.recursive {
        for (_, path) in dirs {
            if let Err(e) = collect_into(root, &path, options, out) {
                tracing::warn!("Skipping folder {:?}: {}", path, e);
            }
        }
    }

    Ok(())
}

/// Compare two names in natural order
/// "image2.jpg" < "image10.jpg"
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_sort_key(a).cmp(&natural_sort_key(b))
}

fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                if let Ok(n) = current_num.parse::<u64>() {
                    parts.push(NaturalSortPart::Num(n));
                }
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        if let Ok(n) = current_num.parse::<u64>() {
            parts.push(NaturalSortPart::Num(n));
        }
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

/// Check if a file is hidden
#[cfg(windows)]
fn is_hidden_file(path: &Path, _name: &str) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_hidden_file(_path: &Path, name: &str) -> bool {
    name.starts_with('.')
}
