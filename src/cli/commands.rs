//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::cli::progress::{format_bytes, print_header, print_info, print_warning, HarvestProgress};
use crate::cli::{Args, Commands};
use crate::core::config::{get_config_path, init_config, open_config_in_editor, Config};
use crate::core::error::HarvestError;
use crate::core::harvester::{self, HarvestConfig, HarvestEvent, HarvestReport, PlannedAction};
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(ref source) = args.source {
        config.paths.source_dir = source.clone();
    }
    if let Some(ref output) = args.output {
        config.paths.destination_dir = output.clone();
    }
    if args.compare_content {
        config.duplicates.compare_content = true;
    }
    if args.no_progress {
        config.output.show_progress = false;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
}

/// Run the appropriate command based on CLI arguments
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    match &args.command {
        Some(Commands::Extract { report }) => {
            extract_data(config, report.as_deref(), &shutdown_flag)?;
        }
        None => {
            extract_data(config, None, &shutdown_flag)?;
        }
        Some(Commands::Scan) => {
            scan_archives(config)?;
        }
        Some(Commands::Config { path, reset }) => {
            handle_config_command(*path, *reset)?;
        }
        Some(Commands::GenerateConfig { file }) => {
            generate_config_file(file.clone())?;
        }
        Some(Commands::ShowConfig) => {
            show_config(config);
        }
    }

    Ok(())
}

/// Exit status for errors that end the run with a plain message
///
/// A missing or empty source folder is reported on stdout with status 1.
/// Any other error returns `None` and is left to the caller.
pub fn exit_code(err: &anyhow::Error) -> Option<i32> {
    match err.downcast_ref::<HarvestError>() {
        Some(HarvestError::NoArchives { .. }) => Some(1),
        _ => None,
    }
}

/// Display name of a folder for user-facing messages
fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Line printed for a file that was not copied
pub fn skipped_line(name: &str, same_content: Option<bool>) -> String {
    match same_content {
        Some(false) => format!("Skipped (already there): {} (different content)", name),
        _ => format!("Skipped (already there): {}", name),
    }
}

/// Unpack every archive and copy the data files into the destination
pub fn extract_data(
    config: &Config,
    report_path: Option<&Path>,
    shutdown_flag: &AtomicBool,
) -> Result<HarvestReport> {
    let harvest_config = HarvestConfig::from(config);
    let mut progress: Option<HarvestProgress> = None;

    let report = harvester::harvest(&harvest_config, shutdown_flag, |event| match event {
        HarvestEvent::Started { archives } => {
            progress = Some(HarvestProgress::new(
                archives as u64,
                config.output.show_progress,
            ));
        }
        HarvestEvent::ArchiveStarted { archive, .. } => {
            if let Some(ref p) = progress {
                p.archive_started(&archive.file_name().unwrap_or_default().to_string_lossy());
            }
        }
        HarvestEvent::FileCopied { name, bytes } => {
            let line = format!("Got it: {}", name);
            match progress {
                Some(ref p) => {
                    p.file_copied(bytes);
                    p.log(&line);
                }
                None => println!("{}", line),
            }
        }
        HarvestEvent::FileSkipped { name, same_content } => {
            let line = skipped_line(name, same_content);
            match progress {
                Some(ref p) => p.log(&line),
                None => println!("{}", line),
            }
        }
        HarvestEvent::ArchiveFinished { summary } => {
            info!(
                "{}: {} copied, {} skipped",
                summary.archive.display(),
                summary.copied(),
                summary.skipped()
            );
            if summary.entries_rejected > 0 {
                warn!(
                    "{}: {} entries with unsafe paths were ignored",
                    summary.archive.display(),
                    summary.entries_rejected
                );
            }
            if let Some(ref p) = progress {
                p.archive_finished();
            }
        }
    })?;

    if let Some(ref p) = progress {
        if report.interrupted {
            p.finish_interrupted();
        } else {
            p.finish();
        }
    }

    info!("{}", report);

    if let Some(path) = report_path {
        let json = report.to_json().context("Failed to serialize run report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write run report '{}'", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    if report.interrupted {
        warn!("Extraction interrupted; files copied so far were kept.");
    } else {
        println!(
            "Done! All data files are now in the {} folder.",
            folder_name(&config.paths.destination_dir)
        );
    }

    Ok(report)
}

/// List what each archive would contribute, without writing anything
pub fn scan_archives(config: &Config) -> Result<()> {
    let harvest_config = HarvestConfig::from(config);
    let plans = harvester::plan(&harvest_config)?;
    let destination = folder_name(&config.paths.destination_dir);

    print_header("Archive scan");

    let mut to_copy = 0usize;
    let mut bytes = 0u64;
    let mut skipped = 0usize;

    for plan in &plans {
        println!("{}", plan.archive.display());
        if plan.files.is_empty() {
            print_info("no data files");
            continue;
        }

        for file in &plan.files {
            let entry = &file.entry;
            match file.action {
                PlannedAction::Copy => {
                    to_copy += 1;
                    bytes += entry.size;
                    println!(
                        "  + {} ({})",
                        entry.path.display(),
                        format_bytes(entry.size)
                    );
                }
                PlannedAction::SkipExisting => {
                    skipped += 1;
                    println!(
                        "  = {} (already in {})",
                        entry.path.display(),
                        destination
                    );
                }
                PlannedAction::SkipEarlier => {
                    skipped += 1;
                    println!(
                        "  = {} (name taken by an earlier file)",
                        entry.path.display()
                    );
                }
            }
        }
    }

    println!();
    print_info(&format!(
        "{} archive(s): {} file(s) to copy ({}), {} to skip",
        plans.len(),
        to_copy,
        format_bytes(bytes),
        skipped
    ));

    Ok(())
}

/// Show, reset, or open the configuration file
pub fn handle_config_command(show_path: bool, reset: bool) -> Result<()> {
    if reset {
        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                fs::remove_file(&config_path)?;
                info!("Removed existing config file");
            }
        }
        let path = init_config()?;
        info!("Created fresh config file at: {}", path.display());
        return Ok(());
    }

    if show_path {
        let path = Config::get_active_config_path();
        println!("{}", path.display());
        if path.exists() {
            info!("Config file exists at: {}", path.display());
        } else {
            info!("Config file would be created at: {}", path.display());
        }
        return Ok(());
    }

    info!("Opening configuration file in default editor...");
    match open_config_in_editor() {
        Ok(path) => {
            info!("Config file: {}", path.display());
            info!("Run 'data-extract show-config' to verify your settings.");
        }
        Err(e) => {
            error!("Failed to open config file: {}", e);
            if let Some(path) = get_config_path() {
                info!("You can manually edit the config at: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Generate a configuration file at the specified or default location
pub fn generate_config_file(file: Option<PathBuf>) -> Result<()> {
    let output_path = match file {
        Some(path) => {
            fs::write(&path, Config::generate_default_config())
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            path
        }
        None => init_config()?,
    };

    info!("Configuration file: {}", output_path.display());
    info!("Edit this file to change folders, logging, or duplicate reporting.");

    Ok(())
}

/// Show the current configuration settings
pub fn show_config(config: &Config) {
    let config_path = Config::get_active_config_path();
    info!("Configuration file: {}", config_path.display());
    if !config_path.exists() {
        info!("(Using default settings - no config file found)");
    }

    match config.to_toml_string() {
        Ok(text) => {
            println!();
            println!("{}", text.trim_end());
        }
        Err(e) => print_warning(&format!("Could not render configuration: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_overrides_replace_config_values() {
        let args = Args::parse_from([
            "data-extract",
            "-s",
            "inbox",
            "-o",
            "out",
            "--compare-content",
            "--no-progress",
            "-l",
            "debug",
        ]);
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.paths.source_dir, PathBuf::from("inbox"));
        assert_eq!(config.paths.destination_dir, PathBuf::from("out"));
        assert!(config.duplicates.compare_content);
        assert!(!config.output.show_progress);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = Args::parse_from(["data-extract"]);
        let mut config = Config::default();
        config.duplicates.compare_content = true;
        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.paths.source_dir, PathBuf::from("ZippedData"));
        assert!(config.duplicates.compare_content);
        assert!(config.output.show_progress);
    }

    #[test]
    fn test_skipped_line() {
        assert_eq!(skipped_line("x.csv", None), "Skipped (already there): x.csv");
        assert_eq!(
            skipped_line("x.csv", Some(true)),
            "Skipped (already there): x.csv"
        );
        assert_eq!(
            skipped_line("x.csv", Some(false)),
            "Skipped (already there): x.csv (different content)"
        );
    }

    #[test]
    fn test_folder_name() {
        assert_eq!(folder_name(Path::new("Data")), "Data");
        assert_eq!(folder_name(Path::new("/srv/out/Data")), "Data");
    }

    #[test]
    fn test_extract_writes_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("ZippedData");
        fs::create_dir_all(&source).unwrap();
        crate::archive::fixtures::write_zip(&source.join("a.zip"), &[("x.csv", b"1")]);

        let mut config = Config::default();
        config.paths.source_dir = source;
        config.paths.destination_dir = dir.path().join("Data");
        config.output.show_progress = false;

        let report_path = dir.path().join("report.json");
        let shutdown = AtomicBool::new(false);
        let report = extract_data(&config, Some(&report_path), &shutdown).unwrap();

        assert_eq!(report.files_copied(), 1);
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["archives"][0]["files"][0]["name"], "x.csv");
    }

    #[test]
    fn test_missing_source_maps_to_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.source_dir = dir.path().join("ZippedData");
        config.paths.destination_dir = dir.path().join("Data");
        config.output.show_progress = false;

        let shutdown = AtomicBool::new(false);
        let err = extract_data(&config, None, &shutdown).unwrap_err();

        assert_eq!(exit_code(&err), Some(1));
        assert_eq!(
            err.to_string(),
            "Oops, no 'ZippedData/' folder or no zip files in there.\n\
             Pop your zip files into 'ZippedData/' and try again."
        );
        assert!(!config.paths.destination_dir.exists());
    }

    #[test]
    fn test_other_errors_have_no_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("ZippedData");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("bad.zip"), b"not a zip").unwrap();

        let mut config = Config::default();
        config.paths.source_dir = source;
        config.paths.destination_dir = dir.path().join("Data");
        config.output.show_progress = false;

        let shutdown = AtomicBool::new(false);
        let err = extract_data(&config, None, &shutdown).unwrap_err();
        assert_eq!(exit_code(&err), None);
        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), None);
    }

    #[test]
    fn test_generate_config_to_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        generate_config_file(Some(path.clone())).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
