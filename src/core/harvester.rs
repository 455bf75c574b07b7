//! Data harvesting pipeline
//!
//! Runs the whole job: check the source folder, make sure the destination
//! exists, then for each archive unpack it into a temporary workspace, copy
//! its data files into the flat destination (first name wins), and remove
//! the workspace again.
//!
//! Progress is reported through a [`HarvestEvent`] callback so the CLI can
//! print and draw while the library stays free of console output.

use crate::archive::{find_archives, list_data_entries, unpack_to_workspace, ArchiveEntry};
use crate::copy::{copy_if_absent, CopyOutcome};
use crate::core::config::Config;
use crate::core::error::{HarvestError, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Settings for one harvesting run
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    /// Folder holding the `.zip` files
    pub source_dir: PathBuf,
    /// Flat folder receiving the data files
    pub destination_dir: PathBuf,
    /// Compare skipped files against the copy already kept
    pub compare_content: bool,
}

impl HarvestConfig {
    pub fn new(source_dir: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
            compare_content: false,
        }
    }

    pub fn compare_content(mut self, enabled: bool) -> Self {
        self.compare_content = enabled;
        self
    }
}

impl From<&Config> for HarvestConfig {
    fn from(config: &Config) -> Self {
        Self::new(
            config.paths.source_dir.clone(),
            config.paths.destination_dir.clone(),
        )
        .compare_content(config.duplicates.compare_content)
    }
}

/// What happened to one qualifying file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Copied into the destination
    Copied { name: String, bytes: u64 },
    /// A file with this name was already in the destination
    Skipped {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        same_content: Option<bool>,
    },
}


/// Per-archive results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArchiveSummary {
    /// Archive path
    pub archive: PathBuf,
    /// Outcome of every qualifying file, in processing order
    pub files: Vec<FileOutcome>,
    /// Entries ignored because their path escaped the extraction folder
    pub entries_rejected: usize,
}

impl ArchiveSummary {
    fn new(archive: &Path) -> Self {
        Self {
            archive: archive.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn copied(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Copied { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.files.len() - self.copied()
    }

    pub fn bytes_copied(&self) -> u64 {
        self.files
            .iter()
            .map(|f| match f {
                FileOutcome::Copied { bytes, .. } => *bytes,
                FileOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}

/// Results of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub archives: Vec<ArchiveSummary>,
    /// True when the run stopped early on a shutdown request
    pub interrupted: bool,
}

impl HarvestReport {
    pub fn files_copied(&self) -> usize {
        self.archives.iter().map(ArchiveSummary::copied).sum()
    }

    pub fn files_skipped(&self) -> usize {
        self.archives.iter().map(ArchiveSummary::skipped).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.archives.iter().map(ArchiveSummary::bytes_copied).sum()
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_mb = self.total_bytes() as f64 / 1_048_576.0;
        write!(
            f,
            "Archives: {}, Copied: {}, Skipped: {}, Total size: {:.2} MB",
            self.archives.len(),
            self.files_copied(),
            self.files_skipped(),
            size_mb
        )
    }
}

/// Progress notifications emitted while harvesting
#[derive(Debug, Clone, Copy)]
pub enum HarvestEvent<'a> {
    /// Archives found, destination ready
    Started { archives: usize },
    /// About to unpack an archive (`index` counts from 0)
    ArchiveStarted {
        index: usize,
        total: usize,
        archive: &'a Path,
    },
    FileCopied { name: &'a str, bytes: u64 },
    FileSkipped {
        name: &'a str,
        same_content: Option<bool>,
    },
    /// Archive done and its workspace removed
    ArchiveFinished { summary: &'a ArchiveSummary },
}

/// Check the source folder and prepare the destination
///
/// Returns the archives to process. Nothing is written when the source
/// folder is missing or empty.
pub fn prepare(config: &HarvestConfig) -> Result<Vec<PathBuf>> {
    let archives = find_archives(&config.source_dir)?;

    fs::create_dir_all(&config.destination_dir)
        .map_err(|e| HarvestError::io(&config.destination_dir, e))?;
    debug!("Destination ready: {}", config.destination_dir.display());

    Ok(archives)
}

/// Run the full pipeline
///
/// Any I/O or archive error aborts the run; files already copied stay in
/// place and the workspace of the failing archive is removed. Setting
/// `shutdown` stops the run before the next file, and the returned report is
/// marked as interrupted.
pub fn harvest<F>(config: &HarvestConfig, shutdown: &AtomicBool, mut on_event: F) -> Result<HarvestReport>
where
    F: FnMut(HarvestEvent<'_>),
{
    let started_at = Utc::now();
    let archives = prepare(config)?;
    let total = archives.len();

    info!(
        "Processing {} archive(s) from {} into {}",
        total,
        config.source_dir.display(),
        config.destination_dir.display()
    );
    on_event(HarvestEvent::Started { archives: total });

    let mut summaries = Vec::with_capacity(total);
    let mut interrupted = false;

    for (index, archive) in archives.iter().enumerate() {
        if shutdown.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }

        on_event(HarvestEvent::ArchiveStarted {
            index,
            total,
            archive: archive.as_path(),
        });

        let (summary, stopped) = process_archive(archive, config, shutdown, &mut on_event)?;
        on_event(HarvestEvent::ArchiveFinished { summary: &summary });
        summaries.push(summary);

        if stopped {
            interrupted = true;
            break;
        }
    }

    if interrupted {
        warn!("Shutdown requested, stopped before finishing all archives");
    }

    Ok(HarvestReport {
        source_dir: config.source_dir.clone(),
        destination_dir: config.destination_dir.clone(),
        started_at,
        finished_at: Utc::now(),
        archives: summaries,
        interrupted,
    })
}

/// Unpack one archive, copy its data files, remove the workspace
///
/// The returned flag is true when a shutdown request cut the archive short.
fn process_archive<F>(
    archive: &Path,
    config: &HarvestConfig,
    shutdown: &AtomicBool,
    on_event: &mut F,
) -> Result<(ArchiveSummary, bool)>
where
    F: FnMut(HarvestEvent<'_>),
{
    let mut summary = ArchiveSummary::new(archive);
    let mut stopped = false;

    let unpacked = unpack_to_workspace(archive, &config.source_dir)?;
    summary.entries_rejected = unpacked.entries_rejected();

    let data_files = unpacked.data_files()?;
    debug!(
        "{}: {} file(s) extracted, {} qualifying",
        unpacked.archive().display(),
        unpacked.files_written(),
        data_files.len()
    );

    for file in &data_files {
        if shutdown.load(Ordering::SeqCst) {
            stopped = true;
            break;
        }

        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match copy_if_absent(file, &config.destination_dir, config.compare_content)? {
            CopyOutcome::Copied { bytes, .. } => {
                on_event(HarvestEvent::FileCopied { name: &name, bytes });
                summary.files.push(FileOutcome::Copied { name, bytes });
            }
            CopyOutcome::AlreadyPresent { same_content, .. } => {
                on_event(HarvestEvent::FileSkipped {
                    name: &name,
                    same_content,
                });
                summary.files.push(FileOutcome::Skipped { name, same_content });
            }
        }
    }

    unpacked.cleanup()?;
    Ok((summary, stopped))
}

/// What a run would do with one qualifying file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    /// Would be copied
    Copy,
    /// The destination already has a file with this name
    SkipExisting,
    /// An earlier file in this run claims the name first
    SkipEarlier,
}

/// Planned outcome for one entry of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub entry: ArchiveEntry,
    pub action: PlannedAction,
}

/// Planned outcomes for one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePlan {
    pub archive: PathBuf,
    pub files: Vec<PlannedFile>,
}

/// Work out what [`harvest`] would do, without extracting or copying
///
/// Archives are read in the same order as a real run, so the plan reports
/// which file wins each name.
pub fn plan(config: &HarvestConfig) -> Result<Vec<ArchivePlan>> {
    let archives = find_archives(&config.source_dir)?;
    let mut claimed: HashSet<String> = HashSet::new();
    let mut plans = Vec::with_capacity(archives.len());

    for archive in archives {
        let mut files = Vec::new();
        for entry in list_data_entries(&archive)? {
            let action = if fs::symlink_metadata(config.destination_dir.join(&entry.name)).is_ok() {
                PlannedAction::SkipExisting
            } else if !claimed.insert(entry.name.clone()) {
                PlannedAction::SkipEarlier
            } else {
                PlannedAction::Copy
            };
            files.push(PlannedFile { entry, action });
        }
        plans.push(ArchivePlan { archive, files });
    }

    Ok(plans)
}
