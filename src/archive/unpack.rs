//! Archive unpacking
//!
//! Each archive is extracted in full into its own temporary folder created
//! next to the archives. The folder is owned by [`UnpackedArchive`] and
//! removed by [`UnpackedArchive::cleanup`], or on drop if processing bails
//! out early.

use crate::core::error::{HarvestError, Result};
use crate::core::filter::is_qualifying_path;
use log::{debug, trace, warn};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Prefix of the temporary extraction folders
pub const WORKSPACE_PREFIX: &str = "temp_extracted";

/// An archive extracted into a temporary workspace
#[derive(Debug)]
pub struct UnpackedArchive {
    archive: PathBuf,
    workspace: TempDir,
    files_written: usize,
    entries_rejected: usize,
}

impl UnpackedArchive {
    /// Path of the archive this workspace was filled from
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Root of the extracted tree
    pub fn path(&self) -> &Path {
        self.workspace.path()
    }

    /// Number of regular files written
    pub fn files_written(&self) -> usize {
        self.files_written
    }

    /// Number of entries dropped because their path escaped the workspace
    pub fn entries_rejected(&self) -> usize {
        self.entries_rejected
    }

    /// Every qualifying regular file in the extracted tree, at any depth
    ///
    /// Entries are visited in file name order within each folder.
    pub fn data_files(&self) -> Result<Vec<PathBuf>> {
        let root = self.path();
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| HarvestError::Walk {
                root: root.to_path_buf(),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if is_qualifying_path(entry.path()) {
                trace!("Data file: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Delete the workspace and everything in it
    pub fn cleanup(self) -> Result<()> {
        let path = self.workspace.path().to_path_buf();
        self.workspace
            .close()
            .map_err(|e| HarvestError::io(path, e))
    }
}

/// Extract `archive` into a fresh temporary folder inside `parent`
///
/// Entries whose names would land outside the workspace (absolute paths,
/// `..` components) are skipped with a warning. Any other read or write
/// failure aborts the extraction.
pub fn unpack_to_workspace(archive: &Path, parent: &Path) -> Result<UnpackedArchive> {
    let workspace = tempfile::Builder::new()
        .prefix(WORKSPACE_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| HarvestError::io(parent, e))?;

    debug!(
        "Extracting {} into {}",
        archive.display(),
        workspace.path().display()
    );

    let file = File::open(archive).map_err(|e| HarvestError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| HarvestError::Archive {
        archive: archive.to_path_buf(),
        source: e,
    })?;

    let mut files_written = 0;
    let mut entries_rejected = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| HarvestError::Archive {
            archive: archive.to_path_buf(),
            source: e,
        })?;

        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                warn!(
                    "Skipping unsafe entry '{}' in {}",
                    entry.name(),
                    archive.display()
                );
                entries_rejected += 1;
                continue;
            }
        };
        let target = workspace.path().join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| HarvestError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))?;
        }

        let mut out = File::create(&target).map_err(|e| HarvestError::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| HarvestError::io(&target, e))?;

        trace!("Extracted {}", relative.display());
        files_written += 1;
    }

    Ok(UnpackedArchive {
        archive: archive.to_path_buf(),
        workspace,
        files_written,
        entries_rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::write_zip;
    use tempfile::TempDir;

    #[test]
    fn test_unpack_keeps_nested_layout() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(
            &archive,
            &[
                ("top.csv", b"a,b\n1,2\n"),
                ("nested/deeper/inner.json", b"{}"),
                ("notes.md", b"# notes"),
            ],
        );

        let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
        assert_eq!(unpacked.files_written(), 3);
        assert!(unpacked.path().join("top.csv").is_file());
        assert!(unpacked
            .path()
            .join("nested")
            .join("deeper")
            .join("inner.json")
            .is_file());
        assert_eq!(
            fs::read(unpacked.path().join("top.csv")).unwrap(),
            b"a,b\n1,2\n"
        );
    }

    #[test]
    fn test_workspace_created_inside_parent() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("x.csv", b"1")]);

        let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
        assert_eq!(unpacked.path().parent().unwrap(), dir.path());
        let name = unpacked.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(WORKSPACE_PREFIX));
    }

    #[test]
    fn test_data_files_filters_and_recurses() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(
            &archive,
            &[
                ("b.txt", b"b"),
                ("a.csv", b"a"),
                ("skip.md", b"md"),
                ("sub/c.sqlite", b"c"),
            ],
        );

        let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
        let names: Vec<_> = unpacked
            .data_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.txt", "c.sqlite"]);
    }

    #[test]
    fn test_cleanup_removes_workspace() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("deep/x.csv", b"1")]);

        let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
        let workspace = unpacked.path().to_path_buf();
        unpacked.cleanup().unwrap();
        assert!(!workspace.exists());
    }

    #[test]
    fn test_drop_removes_workspace() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("x.csv", b"1")]);

        let workspace = {
            let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
            unpacked.path().to_path_buf()
        };
        assert!(!workspace.exists());
    }

    #[test]
    fn test_unsafe_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("../escape.csv", b"bad"), ("ok.csv", b"good")]);

        let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
        assert_eq!(unpacked.files_written(), 1);
        assert_eq!(unpacked.entries_rejected(), 1);
        assert!(!dir.path().join("escape.csv").exists());
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"this is not a zip file").unwrap();

        let err = unpack_to_workspace(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, HarvestError::Archive { .. }));
    }
}
