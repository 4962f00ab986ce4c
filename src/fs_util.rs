use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;

use crate::error::SignatureError;

/// Opens a matrix or metadata file, transparently decompressing `.gz` inputs.
pub fn open_input(path: &Utf8Path) -> Result<Box<dyn Read>, SignatureError> {
    let file = File::open(path.as_std_path())
        .map_err(|err| SignatureError::Filesystem(format!("open {path}: {err}")))?;

    match path.extension() {
        Some("gz") => Ok(Box::new(BufReader::new(MultiGzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Writes through a temp file in the destination directory and persists it
/// over `path` once `write` succeeds.
pub fn write_atomic<F>(path: &Utf8Path, write: F) -> Result<(), SignatureError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), SignatureError>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| SignatureError::Filesystem(err.to_string()))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".kira-sig")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| SignatureError::Filesystem(err.to_string()))?;
    {
        let mut writer = io::BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer
            .flush()
            .map_err(|err| SignatureError::Filesystem(err.to_string()))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| SignatureError::Filesystem(format!("write {path}: {err}")))?;
    Ok(())
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), SignatureError> {
    write_atomic(path, |writer| {
        writer
            .write_all(content)
            .map_err(|err| SignatureError::Filesystem(err.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use camino::Utf8PathBuf;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[test]
    fn reads_gzip_and_plain_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let plain = temp_path(&dir, "matrix.tsv");
        let gzipped = temp_path(&dir, "matrix.tsv.gz");

        fs::write(&plain, "Samples\tA\n").unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"Samples\tA\n").unwrap();
        fs::write(&gzipped, encoder.finish().unwrap()).unwrap();

        for path in [plain, gzipped] {
            let mut text = String::new();
            open_input(&path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "Samples\tA\n");
        }
    }

    #[test]
    fn atomic_write_leaves_only_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = temp_path(&dir, "out/payload.json");

        write_bytes_atomic(&target, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        let entries = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_write_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = temp_path(&dir, "matrix.tsv");
        fs::write(&target, "old").unwrap();

        let result = write_atomic(&target, |_| Err(SignatureError::Filesystem("boom".into())));

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
    }
}
