//! Corpus enumeration.
//!
//! [`list_corpus`] returns the regular files directly inside a corpus
//! directory, sorted by file name so every run checks them in the same order.
//! Subdirectories are not descended into. Symlinks are followed, so a link to
//! a regular file counts as a corpus entry and a link to a directory does not.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::HarnessError;

/// List the corpus files in `dir`, ordered by file name.
///
/// A missing or unreadable directory is a [`HarnessError::Corpus`] error; an
/// empty directory yields an empty list.
pub fn list_corpus(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut result = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .io_error()
                .map(|io| io::Error::new(io.kind(), io.to_string()))
                .unwrap_or_else(|| io::Error::other(e.to_string()));
            HarnessError::Corpus { path, source }
        })?;
        if entry.file_type().is_file() {
            result.push(entry.into_path());
        }
    }
    Ok(result)
}
