//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Unpack ZIP archives and gather their data files into one flat folder
#[derive(Parser, Debug)]
#[command(name = "data-extract")]
#[command(author = "Vihaan Reddy M")]
#[command(version)]
#[command(
    about = "Unpack ZippedData/*.zip and collect every .csv, .json, .xlsx, .xls, .sqlite, .db and .txt file into Data/",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder holding the zip files (overrides config)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Folder receiving the data files (overrides config)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Report whether skipped files differ from the copy already kept
    #[arg(long, global = true)]
    pub compare_content: bool,

    /// Do not draw a progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Extract the archives and copy their data files (default)
    Extract {
        /// Write a JSON summary of the run to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Show which files each archive would contribute, without extracting
    Scan,

    /// Open the configuration file in your default editor
    ///
    /// If no config file exists, a default one will be created.
    Config {
        /// Show the config file path without opening it
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (creates a fresh config file)
        #[arg(long)]
        reset: bool,
    },

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Where to write the config file (defaults to standard location)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_default_run() {
        let args = Args::try_parse_from(["data-extract"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.source.is_none());
        assert!(args.output.is_none());
        assert!(!args.compare_content);
    }

    #[test]
    fn test_overrides_after_subcommand() {
        let args = Args::try_parse_from([
            "data-extract",
            "extract",
            "--report",
            "run.json",
            "-s",
            "inbox",
            "-o",
            "collected",
            "--compare-content",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Extract {
                report: Some(PathBuf::from("run.json"))
            })
        );
        assert_eq!(args.source, Some(PathBuf::from("inbox")));
        assert_eq!(args.output, Some(PathBuf::from("collected")));
        assert!(args.compare_content);
    }

    #[test]
    fn test_config_flags() {
        let args = Args::try_parse_from(["data-extract", "config", "--path"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Config {
                path: true,
                reset: false
            })
        );
    }
}
