//! Archive discovery
//!
//! Lists the `.zip` files sitting directly in the source folder.

use crate::core::error::{HarvestError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix an archive file name must end with (case-sensitive)
const ARCHIVE_SUFFIX: &str = ".zip";

/// Check whether a file name looks like a ZIP archive
pub fn is_archive_name(name: &str) -> bool {
    name.ends_with(ARCHIVE_SUFFIX)
}

/// Find the archives to process in `source_dir`
///
/// Only the top level of the folder is searched, and directories are ignored
/// even when their name ends in `.zip`. The result is sorted by file name so
/// that "first file wins" is decided the same way on every run.
///
/// Fails with [`HarvestError::NoArchives`] when the folder is missing or holds
/// no archives.
pub fn find_archives(source_dir: &Path) -> Result<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        debug!("Source folder missing: {}", source_dir.display());
        return Err(HarvestError::no_archives(source_dir));
    }

    let entries = fs::read_dir(source_dir).map_err(|e| HarvestError::io(source_dir, e))?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HarvestError::io(source_dir, e))?;
        let path = entry.path();

        let is_candidate = entry
            .file_name()
            .to_str()
            .map(is_archive_name)
            .unwrap_or(false);
        if !is_candidate || path.is_dir() {
            continue;
        }

        archives.push(path);
    }

    if archives.is_empty() {
        return Err(HarvestError::no_archives(source_dir));
    }

    archives.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(
        "Found {} archive(s) in {}",
        archives.len(),
        source_dir.display()
    );

    Ok(archives)
}
