//! Archive extraction for downloaded tor releases.
//!
//! Unpacks gzip-compressed or plain tar archives, dropping the leading
//! directory the release archives wrap their contents in, and refuses entries
//! that would land outside the destination.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Trait for extracting downloaded archives, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the directory holding the extracted tree.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry
    /// attempts to escape the destination directory.
    /// Returns [`ExtractionError::EmptyArchive`] if nothing was unpacked.
    /// Returns [`ExtractionError::Io`] on I/O failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<PathBuf, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains nothing below the stripped prefix.
    #[error("archive contains no files")]
    EmptyArchive,
}

/// Extractor for `.tar.gz` and `.tar` archives.
pub struct TarExtractor {
    strip_components: usize,
}

impl TarExtractor {
    pub fn new(strip_components: usize) -> Self {
        Self { strip_components }
    }
}

impl Default for TarExtractor {
    /// Release archives wrap everything in one top-level directory
    fn default() -> Self {
        Self::new(1)
    }
}

impl ArchiveExtractor for TarExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<PathBuf, ExtractionError> {
        std::fs::create_dir_all(dest_dir)?;
        let mut archive = tar::Archive::new(open_archive(archive_path)?);
        let mut unpacked = 0usize;

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            let entry_path = entry.path()?.into_owned();

            validate_entry_path(&entry_path)?;

            let stripped: PathBuf = entry_path
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .skip(self.strip_components)
                .collect();
            if stripped.as_os_str().is_empty() {
                continue;
            }

            let dest_path = dest_dir.join(&stripped);
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            entry.unpack(&dest_path)?;
            unpacked += 1;
        }

        if unpacked == 0 {
            return Err(ExtractionError::EmptyArchive);
        }

        debug!("Unpacked {} entries into {:?}", unpacked, dest_dir);
        Ok(dest_dir.to_path_buf())
    }
}

/// Open an archive, transparently decompressing gzip.
fn open_archive(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if read == magic.len() && magic == GZIP_MAGIC {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use rstest::rstest;
    use tempfile::TempDir;

    fn append(builder: &mut tar::Builder<impl std::io::Write>, path: &str, data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            append(&mut builder, name, data);
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn extract_strips_top_level_directory() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("tor.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("tor-0.4.5.7/bin/tor", b"#!/bin/sh\n"),
                ("tor-0.4.5.7/share/tor/geoip", b"geo"),
            ],
        );
        let dest = temp_dir.path().join("out");

        let extracted = TarExtractor::default().extract(&archive, &dest).unwrap();

        assert_eq!(extracted, dest);
        assert_eq!(std::fs::read(dest.join("bin/tor")).unwrap(), b"#!/bin/sh\n");
        assert_eq!(std::fs::read(dest.join("share/tor/geoip")).unwrap(), b"geo");
        assert!(!dest.join("tor-0.4.5.7").exists());
    }

    #[test]
    fn extract_reads_uncompressed_tar() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("tor.tar");
        let mut builder = tar::Builder::new(File::create(&archive).unwrap());
        append(&mut builder, "bin/tor", b"tor");
        builder.finish().unwrap();
        let dest = temp_dir.path().join("out");

        TarExtractor::new(0).extract(&archive, &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("bin/tor")).unwrap(), b"tor");
    }

    #[test]
    fn extract_rejects_archive_with_nothing_below_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("flat.tar.gz");
        write_tar_gz(&archive, &[("README", b"flat")]);

        let result = TarExtractor::default().extract(&archive, &temp_dir.path().join("out"));

        assert!(matches!(result, Err(ExtractionError::EmptyArchive)));
    }

    #[test]
    fn extract_fails_for_missing_archive() {
        let temp_dir = TempDir::new().unwrap();

        let result = TarExtractor::default()
            .extract(&temp_dir.path().join("absent.tar.gz"), temp_dir.path());

        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[rstest]
    #[case("tor/bin/tor", true)]
    #[case("./tor/bin/tor", true)]
    #[case("../etc/passwd", false)]
    #[case("tor/../../etc/passwd", false)]
    #[case("/etc/passwd", false)]
    fn validate_entry_path_rejects_escapes(#[case] path: &str, #[case] ok: bool) {
        assert_eq!(validate_entry_path(Path::new(path)).is_ok(), ok);
    }
}
