use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry path against `base`, rejecting anything that
/// would land outside of it.
pub fn sanitize_entry_path(entry: &Path, base: &Path) -> Result<PathBuf> {
    if entry.as_os_str().is_empty() || entry.to_string_lossy().contains('\0') {
        return Err(Error::InvalidPath);
    }

    // Reject absolute paths (zip-slip protection)
    if entry.has_root() || matches!(entry.components().next(), Some(Component::Prefix(_))) {
        return Err(Error::ZipSlip {
            entry:    entry.to_path_buf(),
            resolved: entry.to_path_buf(),
        });
    }

    let relative = normalize_relative(entry).ok_or_else(|| Error::ZipSlip {
        entry:    entry.to_path_buf(),
        resolved: base.join(entry),
    })?;

    Ok(base.join(relative))
}

/// Collapse `.` and `..` components; `None` if `..` climbs above the start.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().collect())
}
