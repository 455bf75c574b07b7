//! Data Extraction Tool - CLI Entry Point
//!
//! Unpacks the ZIP archives in a source folder and gathers their data files
//! into one flat destination folder.
//!
//! This binary is a thin wrapper around the library, handling argument parsing,
//! logging setup, and command dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use data_extract::cli::{self, apply_cli_overrides, exit_code, logger_builder, Args, DualWriter};
use data_extract::core::config::Config;
use log::info;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(ref config_path) = args.config {
        match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        }
    } else {
        Config::load_default().unwrap_or_default()
    };

    apply_cli_overrides(&mut config, &args);

    // Set up graceful shutdown handler
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    ctrlc::set_handler(move || {
        if shutdown_flag_clone.load(Ordering::SeqCst) {
            // Second Ctrl+C - force exit
            eprintln!("\nForce shutdown requested. Exiting immediately...");
            std::process::exit(1);
        } else {
            shutdown_flag_clone.store(true, Ordering::SeqCst);
            eprintln!("\nGraceful shutdown requested. Finishing current file... (Press Ctrl+C again to force quit)");
        }
    })
    .context("Failed to set Ctrl+C handler")?;

    // Initialize logger; RUST_LOG wins over the configured level
    let level = config.logging.level.as_str();

    if config.logging.log_to_file {
        // Set up logging to both console and file
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logging.log_file)
            .with_context(|| {
                format!(
                    "Failed to open log file '{}'",
                    config.logging.log_file.display()
                )
            })?;

        logger_builder("RUST_LOG", level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {} {}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .target(env_logger::Target::Pipe(Box::new(DualWriter {
                console: std::io::stderr(),
                file: log_file,
            })))
            .init();

        info!("Logging to file: {}", config.logging.log_file.display());
    } else {
        logger_builder("RUST_LOG", level).init();
    }

    info!("{} v{}", data_extract::NAME, data_extract::VERSION);

    if let Err(e) = cli::run_command(&args, &config, shutdown_flag) {
        if let Some(code) = exit_code(&e) {
            println!("{}", e);
            std::process::exit(code);
        }
        return Err(e);
    }

    Ok(())
}
