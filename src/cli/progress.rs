//! Progress bar utilities for CLI output
//!
//! Key features:
//! - A progress bar over the archives that suspends cleanly while lines are
//!   printed
//! - Consistent visual styling
//! - A dual writer so log lines can go to stderr and a file at once

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// ============================================================================
// Styles - Consistent visual appearance
// ============================================================================

/// Get the progress bar style for archive processing
fn progress_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {spinner:.green} [{bar:40.cyan/dim}] {pos}/{len} archives {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╾─")
}

/// Get the style for completed progress bars
fn completed_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  ✓ [{bar:40.green/dim}] {pos}/{len} archives {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━━")
}

// ============================================================================
// Console output helpers
// ============================================================================

/// Print a header section with a box
pub fn print_header(title: &str) {
    let width = 68;
    let title_padded = format!("{:^width$}", title, width = width - 4);
    println!();
    println!("╔{}╗", "═".repeat(width - 2));
    println!("║{}║", title_padded);
    println!("╚{}╝", "═".repeat(width - 2));
    println!();
}

/// Print an info message with bullet
pub fn print_info(msg: &str) {
    println!("  • {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("  ⚠ {}", msg);
}

// ============================================================================
// Harvest progress tracker
// ============================================================================

/// Progress tracker over the archives of one run
pub struct HarvestProgress {
    progress_bar: ProgressBar,
    start_time: Instant,
    bytes_copied: AtomicU64,
}

impl HarvestProgress {
    /// Create a tracker for `total_archives`; `visible = false` draws nothing
    pub fn new(total_archives: u64, visible: bool) -> Self {
        let progress_bar = if visible {
            let bar = ProgressBar::new(total_archives);
            bar.set_style(progress_bar_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        progress_bar.set_length(total_archives);

        Self {
            progress_bar,
            start_time: Instant::now(),
            bytes_copied: AtomicU64::new(0),
        }
    }

    /// Show which archive is being unpacked
    pub fn archive_started(&self, name: &str) {
        let display_name: String = name.chars().take(30).collect();
        self.progress_bar.set_message(display_name);
    }

    /// Count a finished archive
    pub fn archive_finished(&self) {
        self.progress_bar.inc(1);
    }

    /// Record bytes written to the destination
    pub fn file_copied(&self, bytes: u64) {
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Print a line while suspending the progress display
    pub fn log(&self, msg: &str) {
        self.progress_bar.suspend(|| {
            println!("{}", msg);
        });
    }

    /// Finish the progress display
    pub fn finish(&self) {
        self.progress_bar.set_style(completed_style());
        let elapsed = self.start_time.elapsed();
        self.progress_bar.finish_with_message(format!(
            "({} in {})",
            format_bytes(self.bytes_copied()),
            format_duration(elapsed)
        ));
    }

    /// Finish after a shutdown request
    pub fn finish_interrupted(&self) {
        self.progress_bar
            .abandon_with_message("✗ Interrupted".to_string());
    }

    /// Bytes copied so far
    pub fn bytes_copied(&self) -> u64 {
        self.bytes_copied.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Utility functions
// ============================================================================

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

// ============================================================================
// Logger setup and dual writer for file + console logging
// ============================================================================

/// Logger builder reading its filter from `filter_var` (normally `RUST_LOG`)
///
/// `level` applies when the variable is unset.
pub fn logger_builder(filter_var: &str, level: &str) -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(filter_var, level))
}

/// A writer that writes to both console and file
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = self.console.write(buf);
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
    }

    #[test]
    fn test_logger_level_falls_back_to_config() {
        let logger = logger_builder("DATA_EXTRACT_TEST_FILTER_UNSET", "debug").build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_logger_level_from_environment() {
        std::env::set_var("DATA_EXTRACT_TEST_FILTER_SET", "warn");
        let logger = logger_builder("DATA_EXTRACT_TEST_FILTER_SET", "trace").build();
        assert_eq!(logger.filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_hidden_progress_still_counts() {
        let progress = HarvestProgress::new(3, false);
        progress.archive_started("a.zip");
        progress.file_copied(100);
        progress.file_copied(24);
        progress.archive_finished();
        assert_eq!(progress.progress_bar.position(), 1);
        assert_eq!(progress.bytes_copied(), 124);
    }
}
