//! Qualifying file filter
//!
//! Only data files are gathered from an archive. The rule is a plain,
//! case-sensitive suffix match on the file name, so `report.CSV` and
//! `archive.csv.gz` do not qualify while `.csv` (a bare dotfile) does.

use std::ffi::OsStr;
use std::path::Path;

/// File name suffixes that are copied into the destination folder
pub const QUALIFYING_EXTENSIONS: &[&str] =
    &[".csv", ".json", ".xlsx", ".xls", ".sqlite", ".db", ".txt"];

/// Check whether a file name ends in one of the qualifying suffixes
pub fn is_qualifying_name(name: &str) -> bool {
    QUALIFYING_EXTENSIONS
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

/// Check the final component of a path
///
/// Names that are not valid UTF-8 never qualify.
pub fn is_qualifying_path(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .map(is_qualifying_name)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_extension_qualifies() {
        for name in [
            "x.csv",
            "x.json",
            "x.xlsx",
            "x.xls",
            "x.sqlite",
            "x.db",
            "x.txt",
        ] {
            assert!(is_qualifying_name(name), "{name} should qualify");
        }
    }

    #[test]
    fn test_other_extensions_rejected() {
        for name in ["notes.md", "image.png", "data.csv.gz", "readme", "db"] {
            assert!(!is_qualifying_name(name), "{name} should not qualify");
        }
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(!is_qualifying_name("REPORT.CSV"));
        assert!(!is_qualifying_name("Book.XLSX"));
    }

    #[test]
    fn test_suffix_only_names() {
        assert!(is_qualifying_name(".csv"));
        assert!(is_qualifying_name("archive.tar.txt"));
    }

    #[test]
    fn test_path_uses_file_name_only() {
        assert!(is_qualifying_path(Path::new("nested/dir.csv/x.json")));
        assert!(!is_qualifying_path(Path::new("nested/data.csv/readme")));
    }
}
