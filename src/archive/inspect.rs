//! Archive inspection
//!
//! Reads an archive's central directory to tell which data files it would
//! contribute, without writing anything to disk. Used by the `scan` command.

use crate::core::error::{HarvestError, Result};
use crate::core::filter::is_qualifying_path;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A qualifying file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive
    pub path: PathBuf,
    /// Base name it would get in the destination
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// List the qualifying files of `archive`
///
/// The order matches the order in which an extracted copy is walked, and an
/// entry stored twice under the same path is listed once (the later one, as
/// it would overwrite the earlier on extraction). Unsafe entry names are left
/// out, as they are never extracted.
pub fn list_data_entries(archive: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(archive).map_err(|e| HarvestError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| HarvestError::Archive {
        archive: archive.to_path_buf(),
        source: e,
    })?;

    let mut entries = BTreeMap::new();
    for index in 0..zip.len() {
        let entry = zip.by_index(index).map_err(|e| HarvestError::Archive {
            archive: archive.to_path_buf(),
            source: e,
        })?;

        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            continue;
        };
        if !is_qualifying_path(&path) {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        entries.insert(
            path.clone(),
            ArchiveEntry {
                path,
                name,
                size: entry.size(),
            },
        );
    }

    Ok(entries.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::write_zip;
    use crate::archive::unpack::unpack_to_workspace;
    use tempfile::TempDir;

    #[test]
    fn test_lists_only_data_files() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(
            &archive,
            &[
                ("docs/", b""),
                ("docs/x.csv", b"1,2,3"),
                ("notes.md", b"skip"),
                ("y.db", b"sqlite"),
            ],
        );

        let entries = list_data_entries(&archive).unwrap();
        assert_eq!(
            entries,
            vec![
                ArchiveEntry {
                    path: PathBuf::from("docs/x.csv"),
                    name: "x.csv".to_string(),
                    size: 5,
                },
                ArchiveEntry {
                    path: PathBuf::from("y.db"),
                    name: "y.db".to_string(),
                    size: 6,
                },
            ]
        );
    }

    #[test]
    fn test_order_matches_extracted_walk() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(
            &archive,
            &[
                ("z.txt", b"z"),
                ("b.csv", b"b"),
                ("a/x.json", b"x"),
                ("a.csv", b"a"),
                ("a/deeper/w.xls", b"w"),
            ],
        );

        let listed: Vec<_> = list_data_entries(&archive)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();

        let unpacked = unpack_to_workspace(&archive, dir.path()).unwrap();
        let walked: Vec<_> = unpacked
            .data_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(listed, walked);
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bad.zip");
        std::fs::write(&archive, b"garbage").unwrap();
        assert!(matches!(
            list_data_entries(&archive),
            Err(HarvestError::Archive { .. })
        ));
    }
}
