use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::sanitize::sanitize_entry_path;

/// Summary of a finished extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveReport {
    pub format:      ArchiveFormat,
    pub entry_count: usize,
    pub total_bytes: u64,
}

/// Unpack `archive` into `dest`.
///
/// Entries are written into a staging directory beside `dest` first; only a
/// complete extraction replaces whatever `dest` held before. On failure the
/// staging directory is removed and `dest` is left untouched.
pub fn extract(archive: &Path, dest: &Path) -> Result<ArchiveReport> {
    let format =
        ArchiveFormat::from_path(archive).ok_or_else(|| Error::UnsupportedFormat(archive.to_path_buf()))?;

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreationFailed {
        path: parent.to_path_buf(),
        source,
    })?;

    let staging = tempfile::Builder::new()
        .prefix(".projdl-extract-")
        .tempdir_in(parent)
        .map_err(|source| Error::StagingFailed {
            path: dest.to_path_buf(),
            source,
        })?;
    let content = staging.path().join("content");
    create_dir(&content)?;

    tracing::debug!(archive = %archive.display(), ?format, "extracting");
    let file = File::open(archive)?;
    let report = match format {
        #[cfg(feature = "zip")]
        ArchiveFormat::Zip => extract_zip(file, &content)?,
        #[cfg(feature = "tar")]
        ArchiveFormat::Tar(codec) => extract_tar(codec.decoder(file)?, &content)?,
        #[allow(unreachable_patterns)]
        _ => return Err(Error::UnsupportedFormat(archive.to_path_buf())),
    };

    replace_dir(&content, dest)?;
    tracing::info!(
        dest = %dest.display(),
        entries = report.entry_count,
        bytes = report.total_bytes,
        "extracted archive"
    );

    Ok(ArchiveReport { format, ..report })
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn replace_dir(staged: &Path, dest: &Path) -> Result<()> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dest)?,
        Ok(_) => fs::remove_file(dest)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::rename(staged, dest).map_err(|source| Error::ExtractionFailed {
        path: dest.to_path_buf(),
        source,
    })
}

fn write_entry(reader: &mut impl Read, target: &Path, mode: Option<u32>) -> Result<u64> {
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }
    let mut out = File::create(target).map_err(|source| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source,
    })?;
    let written = io::copy(reader, &mut out).map_err(|e| Error::Corrupted(e.to_string()))?;
    apply_mode(target, mode)?;
    Ok(written)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> { Ok(()) }

#[cfg(feature = "zip")]
fn extract_zip(file: File, base: &Path) -> Result<ArchiveReport> {
    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::Corrupted(e.to_string()))?;
    let mut report = ArchiveReport {
        format:      ArchiveFormat::Zip,
        entry_count: 0,
        total_bytes: 0,
    };

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::Corrupted(e.to_string()))?;
        let target = sanitize_entry_path(Path::new(entry.name()), base)?;

        if entry.is_dir() {
            create_dir(&target)?;
        } else {
            let mode = entry.unix_mode();
            report.total_bytes += write_entry(&mut entry, &target, mode)?;
        }
        report.entry_count += 1;
    }
    Ok(report)
}

#[cfg(feature = "tar")]
fn extract_tar(reader: Box<dyn Read>, base: &Path) -> Result<ArchiveReport> {
    let mut archive = tar::Archive::new(reader);
    let mut report = ArchiveReport {
        format:      ArchiveFormat::Tar(crate::TarCompress::None),
        entry_count: 0,
        total_bytes: 0,
    };

    let entries = archive.entries().map_err(|e| Error::Corrupted(e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::Corrupted(e.to_string()))?;
        let raw: PathBuf = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();
        let target = sanitize_entry_path(&raw, base)?;
        let kind = entry.header().entry_type();

        if kind.is_dir() {
            create_dir(&target)?;
        } else if kind.is_file() {
            let mode = entry.header().mode().ok();
            report.total_bytes += write_entry(&mut entry, &target, mode)?;
        } else {
            tracing::debug!(entry = %raw.display(), ?kind, "skipping non-regular tar entry");
            continue;
        }
        report.entry_count += 1;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TarCompress;
    use std::io::Write;

    fn zip_fixture(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    fn tar_fixture<W: Write>(out: W, entries: &[(&str, &[u8])]) -> W {
        let mut builder = tar::Builder::new(out);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn zip_is_extracted_into_dest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("file.zip");
        zip_fixture(&archive, &[("docs/", b""), ("docs/readme.txt", b"hello"), ("a.bin", b"12345")]);

        let dest = dir.path().join("file_extracted");
        let report = extract(&archive, &dest).unwrap();

        assert_eq!(report.format, ArchiveFormat::Zip);
        assert_eq!(report.entry_count, 3);
        assert_eq!(report.total_bytes, 10);
        assert_eq!(fs::read(dest.join("docs/readme.txt")).unwrap(), b"hello");
        assert_eq!(fs::read(dest.join("a.bin")).unwrap(), b"12345");
    }

    #[test]
    fn tar_gz_is_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        let encoder = flate2::write::GzEncoder::new(File::create(&archive).unwrap(), flate2::Compression::default());
        tar_fixture(encoder, &[("pkg/bin/tool", b"#!/bin/sh\n")]).finish().unwrap();

        let dest = dir.path().join("pkg_extracted");
        let report = extract(&archive, &dest).unwrap();

        assert_eq!(report.format, ArchiveFormat::Tar(TarCompress::Gzip));
        assert_eq!(fs::read(dest.join("pkg/bin/tool")).unwrap(), b"#!/bin/sh\n");
    }

    #[test]
    fn tar_bz2_is_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.bz2");
        let encoder = bzip2::write::BzEncoder::new(File::create(&archive).unwrap(), bzip2::Compression::default());
        tar_fixture(encoder, &[("notes.txt", b"bz")]).finish().unwrap();

        let dest = dir.path().join("out");
        let report = extract(&archive, &dest).unwrap();

        assert_eq!(report.format, ArchiveFormat::Tar(TarCompress::Bzip2));
        assert_eq!(fs::read(dest.join("notes.txt")).unwrap(), b"bz");
    }

    #[test]
    fn existing_dest_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("file.zip");
        zip_fixture(&archive, &[("new.txt", b"new")]);

        let dest = dir.path().join("file_extracted");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.txt"), b"old").unwrap();

        extract(&archive, &dest).unwrap();
        assert!(dest.join("new.txt").exists());
        assert!(!dest.join("stale.txt").exists());
    }

    #[test]
    fn corrupted_archive_leaves_no_dest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"this is not a zip file").unwrap();

        let dest = dir.path().join("broken_extracted");
        assert!(matches!(extract(&archive, &dest), Err(Error::Corrupted(_))));
        assert!(!dest.exists());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".projdl-extract-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn zip_slip_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        zip_fixture(&archive, &[("../../escape.txt", b"pwned")]);

        let dest = dir.path().join("nested").join("evil_extracted");
        assert!(matches!(extract(&archive, &dest), Err(Error::ZipSlip { .. })));
        assert!(!dir.path().join("escape.txt").exists());
        assert!(!dest.exists());
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("setup.exe");
        fs::write(&archive, b"MZ").unwrap();
        assert!(matches!(
            extract(&archive, &dir.path().join("out")),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
