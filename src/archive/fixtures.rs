//! ZIP fixtures for unit tests

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a stored (uncompressed) ZIP archive holding `files`
///
/// Names ending in `/` become directory entries.
pub fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, content) in files {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
    }

    writer.finish().unwrap();
}
