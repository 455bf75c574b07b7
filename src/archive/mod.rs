//! Archive handling module
//!
//! Everything that touches ZIP files lives here: finding them in the source
//! folder, unpacking one into a throwaway workspace, and reading an archive's
//! listing without unpacking it.
//!
//! # Submodules
//!
//! - `discovery` - Locate `*.zip` files in the source folder
//! - `unpack` - Extract an archive into a temporary workspace
//! - `inspect` - List the data files an archive would contribute

pub mod discovery;
pub mod inspect;
pub mod unpack;

#[cfg(test)]
pub(crate) mod fixtures;

pub use discovery::{find_archives, is_archive_name};
pub use inspect::{list_data_entries, ArchiveEntry};
pub use unpack::{unpack_to_workspace, UnpackedArchive};
