//! Data Extraction Tool Library
//!
//! Unpacks every `.zip` archive found in a source folder and gathers the data
//! files inside them (`.csv`, `.json`, `.xlsx`, `.xls`, `.sqlite`, `.db`,
//! `.txt`) into one flat destination folder. A file whose name is already
//! present in the destination is left alone, so the first copy of a name wins.
//!
//! # Architecture
//!
//! - [`core`] - Configuration, error handling, the data-file rule and the
//!   harvest pipeline
//! - [`archive`] - Finding, unpacking and listing ZIP archives
//! - [`copy`] - Copy-if-absent with metadata preservation
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use data_extract::core::harvester::{harvest, HarvestConfig, HarvestEvent};
//! use std::sync::atomic::AtomicBool;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = HarvestConfig::new("ZippedData", "Data");
//!     let shutdown = AtomicBool::new(false);
//!
//!     let report = harvest(&config, &shutdown, |event| {
//!         if let HarvestEvent::FileCopied { name, .. } = event {
//!             println!("Got it: {}", name);
//!         }
//!     })?;
//!
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod copy;
pub mod core;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
