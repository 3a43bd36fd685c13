//! Where downloads land on disk.

use std::path::{Path, PathBuf};

use url::Url;

/// Keep alphanumerics, space, `-` and `_`; trim trailing whitespace.
///
/// A name with nothing left falls back to `project`.
pub fn sanitize_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim_end();
    if safe.trim().is_empty() {
        "project".to_string()
    } else {
        safe.to_string()
    }
}

/// Last path segment of `url`, if it is a usable file name.
fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    (!last.is_empty() && last != "." && last != "..").then(|| last.to_string())
}

/// `<root>/<safe name>/<url file name or "<safe name>.download">`.
///
/// The path depends only on its inputs, so a later run finds and resumes a
/// partial file.
pub fn file_target(root: &Path, name: &str, url: &str) -> PathBuf {
    let safe = sanitize_name(name);
    let file = url_file_name(url).unwrap_or_else(|| format!("{safe}.download"));
    root.join(&safe).join(file)
}

/// `<root>/<safe name>`, or `<safe name>_new` when that already exists.
pub fn clone_target(root: &Path, name: &str) -> PathBuf {
    let safe = sanitize_name(name);
    let target = root.join(&safe);
    if target.exists() {
        root.join(format!("{safe}_new"))
    } else {
        target
    }
}
