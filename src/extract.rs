//! Single-entry archive extraction
//!
//! Release archives contain the fly binary alongside other entries; flyenv
//! only ever wants the one named binary. Both extractors pull that single
//! entry out of the archive into a destination directory and mark it
//! executable so the cache entry is immediately runnable.
//!
//! Uses native Rust libraries - no external tools required.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::output;

/// Mode applied to extracted binaries: the wrapped tool must be invocable
/// by whoever runs the launcher.
const EXECUTABLE_MODE: u32 = 0o777;

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("chmod failed for {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(()) // No-op on non-Unix
}

/// Mark a cached binary executable for everyone.
pub(crate) fn set_executable(path: &Path) -> Result<()> {
    set_mode(path, EXECUTABLE_MODE)
}

/// Extract the entry named `entry_name` from a gzipped tar stream into
/// `dest_dir`, marking it executable. Returns the written path.
///
/// Directory entries and regular files with other names are skipped;
/// entries with unrecognized type flags are reported and skipped.
pub fn extract_tar_gz<R: Read>(reader: R, entry_name: &str, dest_dir: &Path) -> Result<PathBuf> {
    let decoder = flate2::read::GzDecoder::new(reader);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive.entries().context("tar read error")? {
        let mut entry = entry.context("tar entry error")?;
        let path = entry.path().context("tar path error")?.into_owned();

        match entry.header().entry_type() {
            tar::EntryType::Directory => continue,
            tar::EntryType::Regular => {
                if path != Path::new(entry_name) {
                    continue;
                }

                let output_path = dest_dir.join(entry_name);
                let mut file = File::create(&output_path)
                    .with_context(|| format!("cannot create {}", output_path.display()))?;
                std::io::copy(&mut entry, &mut file)
                    .with_context(|| format!("write error for {}", output_path.display()))?;
                set_mode(&output_path, EXECUTABLE_MODE)?;
                return Ok(output_path);
            }
            other => {
                output::warning(&format!(
                    "skipping tar entry {} with unrecognized type {:?}",
                    path.display(),
                    other
                ));
            }
        }
    }

    bail!("archive does not contain an entry named {}", entry_name)
}

/// Extract the entry named `entry_name` from a zip stream into `dest_dir`,
/// marking it executable. Returns the written path.
///
/// The whole stream is buffered in memory first; zip needs random access.
pub fn extract_zip<R: Read>(mut reader: R, entry_name: &str, dest_dir: &Path) -> Result<PathBuf> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .context("error reading archive content")?;

    let mut archive = zip::ZipArchive::new(Cursor::new(content)).context("zip read error")?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context("zip entry error")?;

        if entry.name() != entry_name {
            output::detail(&format!("ignoring {}", entry.name()));
            continue;
        }

        let output_path = dest_dir.join(entry_name);
        let mut file = File::create(&output_path)
            .with_context(|| format!("cannot create {}", output_path.display()))?;
        std::io::copy(&mut entry, &mut file)
            .with_context(|| format!("write error for {}", output_path.display()))?;

        // Preserve the archive's declared mode, then force executable.
        if let Some(mode) = entry.unix_mode() {
            set_mode(&output_path, mode)?;
        }
        set_mode(&output_path, EXECUTABLE_MODE)?;
        return Ok(output_path);
    }

    bail!("archive does not contain an entry named {}", entry_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_tar_gz(entries: &[(&str, tar::EntryType, &[u8])]) -> Vec<u8> {
        let encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, entry_type, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(*entry_type);
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }

        let encoder = builder.into_inner().unwrap();
        encoder.finish().unwrap()
    }

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_tar_gz_single_entry() {
        let temp = tempfile::tempdir().unwrap();
        let archive = build_tar_gz(&[("fly", tar::EntryType::Regular, b"#!/bin/sh\necho fly\n")]);

        let path = extract_tar_gz(&archive[..], "fly", temp.path()).unwrap();

        assert_eq!(path, temp.path().join("fly"));
        assert_eq!(
            std::fs::read(&path).unwrap(),
            b"#!/bin/sh\necho fly\n".to_vec()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_tar_gz_marks_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let archive = build_tar_gz(&[("fly", tar::EntryType::Regular, b"binary")]);

        let path = extract_tar_gz(&archive[..], "fly", temp.path()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn test_extract_tar_gz_skips_other_entries() {
        let temp = tempfile::tempdir().unwrap();
        let archive = build_tar_gz(&[
            ("docs", tar::EntryType::Directory, b""),
            ("README.md", tar::EntryType::Regular, b"readme"),
            ("fly", tar::EntryType::Regular, b"binary"),
        ]);

        let path = extract_tar_gz(&archive[..], "fly", temp.path()).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"binary".to_vec());
        assert!(!temp.path().join("README.md").exists());
        assert!(!temp.path().join("docs").exists());
    }

    #[test]
    fn test_extract_tar_gz_missing_entry_errors() {
        let temp = tempfile::tempdir().unwrap();
        let archive = build_tar_gz(&[("other", tar::EntryType::Regular, b"x")]);

        let err = extract_tar_gz(&archive[..], "fly", temp.path()).unwrap_err();
        assert!(err.to_string().contains("does not contain"));
    }

    #[test]
    fn test_extract_tar_gz_malformed_stream_errors() {
        let temp = tempfile::tempdir().unwrap();
        let result = extract_tar_gz(&b"not a gzip stream"[..], "fly", temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_zip_single_entry() {
        let temp = tempfile::tempdir().unwrap();
        let archive = build_zip(&[
            ("README.md", b"readme".as_slice()),
            ("fly.exe", b"windows binary".as_slice()),
        ]);

        let path = extract_zip(&archive[..], "fly.exe", temp.path()).unwrap();

        assert_eq!(path, temp.path().join("fly.exe"));
        assert_eq!(std::fs::read(&path).unwrap(), b"windows binary".to_vec());
        assert!(!temp.path().join("README.md").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_zip_forces_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let archive = build_zip(&[("fly.exe", b"binary".as_slice())]);

        let path = extract_zip(&archive[..], "fly.exe", temp.path()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn test_extract_zip_missing_entry_errors() {
        let temp = tempfile::tempdir().unwrap();
        let archive = build_zip(&[("other", b"x".as_slice())]);

        let err = extract_zip(&archive[..], "fly.exe", temp.path()).unwrap_err();
        assert!(err.to_string().contains("does not contain"));
    }

    #[test]
    fn test_extract_zip_malformed_errors() {
        let temp = tempfile::tempdir().unwrap();
        let result = extract_zip(&b"not a zip"[..], "fly.exe", temp.path());
        assert!(result.is_err());
    }
}
