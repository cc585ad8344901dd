//! Archive fixtures built at test time

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Files packed into every multi-entry fixture: five files across two directories
pub const FIXTURE_FILES: &[(&str, &[u8])] = &[
    ("files/a.txt", b"The quick brown fox"),
    ("files/b.txt", b"jumps over the lazy dog"),
    ("files/c.bin", &[0u8, 1, 2, 3, 254, 255]),
    ("files/d.md", b"# Heading\n\nSome markdown.\n"),
    ("files/nested/e.txt", b"nested content"),
];

/// Directories present in the fixture tree
pub const FIXTURE_DIRS: &[&str] = &["files", "files/nested"];

/// Bytes that no codec accepts, long enough to fill a tar header block
pub fn garbage() -> Vec<u8> {
    b"corrupted archive payload! ".repeat(40)
}

/// Write the fixture tree under `root`
pub fn write_fixture_tree(root: &Path) {
    for (name, content) in FIXTURE_FILES {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

/// `zipped_files.zip` holding the fixture tree
pub fn create_zip_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("zipped_files.zip");
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for d in FIXTURE_DIRS {
        writer.add_directory(format!("{d}/"), options).unwrap();
    }
    for (name, content) in FIXTURE_FILES {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
    path
}

/// Tarball holding the fixture tree, gzip-compressed when `gzip` is set
pub fn create_tar_fixture(dir: &Path, file_name: &str, gzip: bool) -> PathBuf {
    let src = tempfile::TempDir::new().unwrap();
    write_fixture_tree(src.path());

    let path = dir.join(file_name);
    let file = File::create(&path).unwrap();
    if gzip {
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.append_dir_all("files", src.path().join("files")).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    } else {
        let mut builder = tar::Builder::new(file);
        builder.append_dir_all("files", src.path().join("files")).unwrap();
        builder.finish().unwrap();
    }
    path
}

/// `7zipped.7z` holding the fixture tree
pub fn create_7z_fixture(dir: &Path) -> PathBuf {
    let src = tempfile::TempDir::new().unwrap();
    write_fixture_tree(src.path());

    let path = dir.join("7zipped.7z");
    sevenz_rust::compress_to_path(src.path(), &path).unwrap();
    path
}

/// Single gzip-compressed file called `file_name`
pub fn create_gz_fixture(dir: &Path, file_name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    let mut encoder =
        flate2::write::GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::best());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap();
    path
}

/// File called `file_name` filled with [`garbage`]
pub fn create_corrupt_fixture(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, garbage()).unwrap();
    path
}
