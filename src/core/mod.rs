//! Core functionality module
//!
//! This module contains the core logic of the tool: configuration
//! management, error handling, the data-file rule, and the harvest pipeline.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `filter` - Which file names count as data files
//! - `harvester` - Unpack archives and copy their data files

pub mod config;
pub mod error;
pub mod filter;
pub mod harvester;
