use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use anyhow::Context;
use tracing::{debug, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

#[derive(Debug, Clone)]
pub(crate) struct ArchiveEntry {
    pub(crate) name: String,
    pub(crate) bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub(crate) fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Writes a deflated `.osz`. A partially written archive is removed on failure.
pub(crate) fn write_osz(path: &Path, entries: &[ArchiveEntry]) -> anyhow::Result<()> {
    let file = File::create(path).context("failed to create archive file")?;

    let result = write_entries(file, entries);
    if result.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove partial archive");
        }
    }
    result
}

fn write_entries(file: File, entries: &[ArchiveEntry]) -> anyhow::Result<()> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", entry.name))?;
        zip.write_all(&entry.bytes)
            .with_context(|| format!("failed to write {} into archive", entry.name))?;
        debug!(name = %entry.name, bytes = entry.bytes.len(), "archived");
    }

    zip.finish().context("failed to finish archive")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn entries_round_trip_through_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A - T.osz");
        let entries = vec![
            ArchiveEntry::new("A - T (Sparebeat) [Easy].osu", b"osu file format v14\n".to_vec()),
            ArchiveEntry::new("audio.mp3", vec![1, 2, 3]),
        ];

        write_osz(&path, &entries).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"audio.mp3".to_string()));

        let mut audio = Vec::new();
        archive
            .by_name("audio.mp3")
            .unwrap()
            .read_to_end(&mut audio)
            .unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_entry_fails_and_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.osz");
        let entries = vec![
            ArchiveEntry::new("same.osu", Vec::new()),
            ArchiveEntry::new("same.osu", Vec::new()),
        ];

        assert!(write_osz(&path, &entries).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.osz");
        assert!(write_osz(&path, &[]).is_err());
    }
}
