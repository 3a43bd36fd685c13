use serde::{Deserialize, Serialize};

/// What a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlKind {
    /// A repository on the version-control host; fetched by cloning.
    Vcs,
    File,
    Unknown,
    Error,
}

impl std::fmt::Display for UrlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlKind::Vcs => write!(f, "vcs"),
            UrlKind::File => write!(f, "file"),
            UrlKind::Unknown => write!(f, "unknown"),
            UrlKind::Error => write!(f, "error"),
        }
    }
}

/// Outcome of probing a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub ok:          bool,
    #[serde(rename = "type")]
    pub kind:        UrlKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub reason:      String,
}

impl ProbeResult {
    pub fn reachable(kind: UrlKind, status_code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            ok: true,
            kind,
            status_code,
            reason: reason.into(),
        }
    }

    pub fn failed(status_code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            kind: UrlKind::Error,
            status_code,
            reason: reason.into(),
        }
    }
}
