//! Copy-if-absent into the flat destination folder
//!
//! A data file lands in the destination under its base name only when no
//! entry of that name exists there yet. Copies keep the source's permission
//! bits and its access/modification times.
//!
//! When content comparison is requested, a file that loses to an existing
//! one is compared against it: sizes first, then SHA256 digests, so only
//! same-sized pairs are hashed.

use crate::core::error::{HarvestError, Result};
use filetime::FileTime;
use log::{debug, trace};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Buffer size for streaming hash computation (64KB)
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// SHA256 hash represented as a fixed-size array
pub type Sha256Hash = [u8; 32];

/// Result of offering one file to the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The file was copied to `dest`
    Copied { dest: PathBuf, bytes: u64 },
    /// A same-named entry already existed at `dest`
    ///
    /// `same_content` is only filled in when comparison was requested.
    AlreadyPresent {
        dest: PathBuf,
        same_content: Option<bool>,
    },
}

/// Copy `src` into `dest_dir` unless an entry with its name already exists
pub fn copy_if_absent(src: &Path, dest_dir: &Path, compare_content: bool) -> Result<CopyOutcome> {
    let name = src.file_name().ok_or_else(|| HarvestError::CopyError {
        filename: src.display().to_string(),
        message: "path has no file name".to_string(),
    })?;
    let dest = dest_dir.join(name);

    // symlink_metadata so a dangling link still counts as taken
    if fs::symlink_metadata(&dest).is_ok() {
        let same_content = if !compare_content {
            None
        } else if fs::metadata(&dest).map(|m| m.is_file()).unwrap_or(false) {
            Some(files_match(src, &dest)?)
        } else {
            // a folder or dangling link holds no comparable content
            Some(false)
        };
        trace!("Already present: {}", dest.display());
        return Ok(CopyOutcome::AlreadyPresent { dest, same_content });
    }

    let bytes = copy_with_metadata(src, &dest)?;
    debug!("Copied {} -> {} ({} bytes)", src.display(), dest.display(), bytes);

    Ok(CopyOutcome::Copied { dest, bytes })
}

/// Copy contents and permissions, then carry over the timestamps
pub fn copy_with_metadata(src: &Path, dest: &Path) -> Result<u64> {
    let bytes = fs::copy(src, dest).map_err(|e| HarvestError::CopyError {
        filename: src.display().to_string(),
        message: e.to_string(),
    })?;

    let metadata = fs::metadata(src).map_err(|e| HarvestError::io(src, e))?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest, atime, mtime).map_err(|e| HarvestError::io(dest, e))?;

    Ok(bytes)
}

/// Check whether two files hold identical bytes
pub fn files_match(a: &Path, b: &Path) -> Result<bool> {
    let size_a = fs::metadata(a).map_err(|e| HarvestError::io(a, e))?.len();
    let size_b = fs::metadata(b).map_err(|e| HarvestError::io(b, e))?.len();
    if size_a != size_b {
        return Ok(false);
    }

    let hash_a = compute_file_hash(a)?;
    let hash_b = compute_file_hash(b)?;
    trace!(
        "{}: {} / {}: {}",
        a.display(),
        hash_to_hex(&hash_a),
        b.display(),
        hash_to_hex(&hash_b)
    );

    Ok(hash_a == hash_b)
}

/// Compute SHA256 hash of a file using streaming (memory-efficient)
pub fn compute_file_hash(path: &Path) -> Result<Sha256Hash> {
    let file = File::open(path).map_err(|e| HarvestError::io(path, e))?;

    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| HarvestError::io(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);

    Ok(hash)
}

/// Convert a hash to a hexadecimal string
pub fn hash_to_hex(hash: &Sha256Hash) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}
