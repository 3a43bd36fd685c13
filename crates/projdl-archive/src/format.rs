use std::io::Read;
use std::path::{Path, PathBuf};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(TarCompress),
}

/// Compression codec wrapped around a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompress {
    None,
    Gzip,
    Bzip2,
}

/// Recognized file name suffixes.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tar.bz2", ArchiveFormat::Tar(TarCompress::Bzip2)),
    (".tgz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tar", ArchiveFormat::Tar(TarCompress::None)),
    (".zip", ArchiveFormat::Zip),
];

impl ArchiveFormat {
    /// Classify by file name extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, format)| *format)
    }
}

/// `true` for `.zip`, `.tar`, `.tar.gz`, `.tgz` and `.tar.bz2` files.
pub fn is_archive(path: impl AsRef<Path>) -> bool { ArchiveFormat::from_path(path.as_ref()).is_some() }

/// File name with the archive suffix removed: `tool-1.0.tar.gz` -> `tool-1.0`.
fn archive_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(suffix, _)| name[..name.len() - suffix.len()].to_string())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(name)
        })
}

/// Sibling directory `<stem>_extracted` next to `archive`.
///
/// `stem` overrides the name derived from the archive file.
pub fn extraction_dir(archive: &Path, stem: Option<&str>) -> PathBuf {
    let stem = stem.map(str::to_string).unwrap_or_else(|| archive_stem(archive));
    let parent = archive.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{stem}_extracted"))
}

impl TarCompress {
    /// Wrap `reader` in the decoder for this codec.
    pub fn decoder<R: Read + 'static>(self, reader: R) -> Result<Box<dyn Read>, Error> {
        match self {
            Self::None => Ok(Box::new(reader)),
            #[cfg(feature = "tar")]
            Self::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
            #[cfg(feature = "tar")]
            Self::Bzip2 => Ok(Box::new(bzip2::read::BzDecoder::new(reader))),
            #[cfg(not(feature = "tar"))]
            _ => Err(Error::UnsupportedFormat(PathBuf::new())),
        }
    }
}
