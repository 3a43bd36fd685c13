use url::Url;

use crate::data::{ProbeResult, ResponseHead, UrlKind};

const VCS_HOST: &str = "github.com";

const ARCHIVE_SUFFIXES: &[&str] = &[".zip", ".tar", ".tar.gz", ".tgz", ".tar.bz2"];

/// `github.com` or any subdomain of it.
pub fn is_vcs_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == VCS_HOST || host.ends_with(".github.com")
}

/// Whether the auth token may be sent to `url`: `https://` on the
/// version-control host only.
pub fn accepts_token(url: &str) -> bool {
    Url::parse(url.trim())
        .ok()
        .is_some_and(|u| u.scheme() == "https" && u.host_str().is_some_and(is_vcs_host))
}

/// Whether `url` names a repository on the version-control host: any path
/// there that does not end in an archive suffix.
pub fn looks_like_repository(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    if !parsed.host_str().is_some_and(is_vcs_host) {
        return false;
    }

    let path = parsed.path().trim_end_matches('/').to_ascii_lowercase();
    !ARCHIVE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Classify a probed URL from its response head.
pub fn classify_response(url: &str, head: &ResponseHead) -> ProbeResult {
    let status = Some(head.status);
    if head.status >= 400 {
        return ProbeResult::failed(status, format!("HTTP error {}", head.status));
    }

    if looks_like_repository(url) {
        return ProbeResult::reachable(UrlKind::Vcs, status, "repository on github.com");
    }

    let content_type = head.header("content-type").unwrap_or_default();
    let attachment = head.header("content-disposition").is_some();
    let binary = ["application/", "binary/"]
        .iter()
        .any(|prefix| content_type.to_ascii_lowercase().starts_with(prefix));

    let reason = format!("Content-Type: {content_type}");
    if attachment || binary {
        ProbeResult::reachable(UrlKind::File, status, reason)
    } else {
        ProbeResult::reachable(UrlKind::Unknown, status, reason)
    }
}
