//! Gzip compression of retired log files.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Path of the compressed copy: the original name plus `.gz`.
pub fn compressed_path(src: &Path) -> PathBuf {
    let mut name = src.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compress `src` into `<src>.gz` and remove `src`.
///
/// The archive keeps the source's modification time so age-based retention
/// is unaffected. The source is deleted only once the archive is completely
/// written and synced. On any failure the partial archive is removed and the
/// source is left untouched.
pub fn compress_file(src: &Path) -> io::Result<PathBuf> {
    let dst = compressed_path(src);

    if let Err(e) = write_archive(src, &dst) {
        let _ = fs::remove_file(&dst);
        return Err(e);
    }

    fs::remove_file(src)?;
    Ok(dst)
}

fn write_archive(src: &Path, dst: &Path) -> io::Result<()> {
    let source = File::open(src)?;
    let modified = source.metadata()?.modified()?;
    let mut input = BufReader::new(source);
    let output = File::create(dst)?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    io::copy(&mut input, &mut encoder)?;

    let mut writer = encoder.finish()?;
    writer.flush()?;
    let file = writer.get_ref();
    file.sync_all()?;
    file.set_modified(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_compress_replaces_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app-2024-01-01.log");
        fs::write(&src, "{\"message\":\"one\"}\n{\"message\":\"two\"}\n").unwrap();

        let dst = compress_file(&src).unwrap();
        assert_eq!(dst, dir.path().join("app-2024-01-01.log.gz"));
        assert!(!src.exists());

        let mut decoded = String::new();
        GzDecoder::new(File::open(&dst).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "{\"message\":\"one\"}\n{\"message\":\"two\"}\n");
    }

    #[test]
    fn test_missing_source_leaves_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app-2024-01-01.log");

        assert!(compress_file(&src).is_err());
        assert!(!compressed_path(&src).exists());
    }

    #[test]
    fn test_unwritable_destination_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app-2024-01-01.log");
        fs::write(&src, "data\n").unwrap();
        // A directory squatting on the archive name makes File::create fail.
        fs::create_dir(compressed_path(&src)).unwrap();

        assert!(compress_file(&src).is_err());
        assert!(src.exists());
    }
}
