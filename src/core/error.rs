//! Error types for the data extraction tool
//!
//! This module defines the error types used throughout the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the data extraction tool
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The source folder is missing or holds no `.zip` files
    #[error("Oops, no '{dir_name}/' folder or no zip files in there.\nPop your zip files into '{dir_name}/' and try again.")]
    NoArchives { source_dir: PathBuf, dir_name: String },

    /// A filesystem operation failed on a specific path
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be read as a ZIP file
    #[error("Failed to read archive '{archive}': {source}")]
    Archive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Walking the extracted tree failed
    #[error("Failed to walk '{root}': {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Copying a data file into the destination failed
    #[error("Copy failed for '{filename}': {message}")]
    CopyError { filename: String, message: String },
}

impl HarvestError {
    /// Build the "no archives" error for a source directory
    pub fn no_archives(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let dir_name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_dir.display().to_string());
        HarvestError::NoArchives {
            source_dir,
            dir_name,
        }
    }

    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_archives_message_names_folder() {
        let err = HarvestError::no_archives("ZippedData");
        assert_eq!(
            err.to_string(),
            "Oops, no 'ZippedData/' folder or no zip files in there.\n\
             Pop your zip files into 'ZippedData/' and try again."
        );
    }

    #[test]
    fn test_no_archives_uses_last_component() {
        let err = HarvestError::no_archives("/srv/inbox/ZippedData");
        match err {
            HarvestError::NoArchives { dir_name, .. } => assert_eq!(dir_name, "ZippedData"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
