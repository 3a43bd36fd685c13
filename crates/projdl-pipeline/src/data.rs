//! Records the pipeline consumes and produces.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use projdl_fetch::{ClientSettings, CloneOptions, ProbeResult, TransferOptions, UrlKind};
use serde::{Deserialize, Serialize};

fn default_name() -> String { "project".to_string() }

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_name", alias = "title")]
    pub name:      String,
    #[serde(default, alias = "link")]
    pub url:       String,
    /// Expected SHA-256 of the downloaded file, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256:    Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags:      BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_hook:  Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_hook: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name:      name.into(),
            url:       url.into(),
            sha256:    None,
            tags:      BTreeSet::new(),
            pre_hook:  None,
            post_hook: None,
        }
    }

    pub fn sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    pub fn pre_hook(mut self, command: impl Into<String>) -> Self {
        self.pre_hook = Some(command.into());
        self
    }

    pub fn post_hook(mut self, command: impl Into<String>) -> Self {
        self.post_hook = Some(command.into());
        self
    }

    /// Hook command for `stage`, ignoring blank strings.
    pub fn hook(&self, stage: HookStage) -> Option<&str> {
        let command = match stage {
            HookStage::Pre => self.pre_hook.as_deref(),
            HookStage::Post => self.post_hook.as_deref(),
        };
        command.map(str::trim).filter(|c| !c.is_empty())
    }

    /// Expected digest, ignoring blank strings.
    pub fn expected_sha256(&self) -> Option<&str> { self.sha256.as_deref().map(str::trim).filter(|s| !s.is_empty()) }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Additional transfer attempts after the first.
    pub retries:            u32,
    /// Bytes per second; 0 = unlimited.
    pub bandwidth_limit:    u64,
    pub proxy:              String,
    #[serde(alias = "github_token")]
    pub auth_token:         String,
    /// Seconds a cached probe stays valid.
    pub validate_cache_ttl: u64,
    /// Download root; `<app dir>/downloads` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_path:      Option<PathBuf>,
    #[serde(alias = "webhook_on_event")]
    pub webhook_url:        String,
    pub git_program:        String,
    /// Local catalog file; `<app dir>/projects.json` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_file:      Option<PathBuf>,
    /// Remote catalog, used instead of the local file when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_url:       Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retries:            2,
            bandwidth_limit:    0,
            proxy:              String::new(),
            auth_token:         String::new(),
            validate_cache_ttl: 3600,
            download_path:      None,
            webhook_url:        String::new(),
            git_program:        "git".to_string(),
            projects_file:      None,
            projects_url:       None,
        }
    }
}

impl Config {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::default()
            .proxy(self.proxy.as_str())
            .auth_token(self.auth_token.as_str())
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions::default()
            .retries(self.retries)
            .bandwidth_limit(self.bandwidth_limit)
    }

    pub fn clone_options(&self) -> CloneOptions {
        let token = self.auth_token.trim();
        CloneOptions {
            git_program: self.git_program.clone(),
            auth_token:  (!token.is_empty()).then(|| token.to_string()),
        }
    }

    pub fn webhook(&self) -> Option<&str> { Some(self.webhook_url.trim()).filter(|u| !u.is_empty()) }

    pub fn download_root(&self, app_dir: &Path) -> PathBuf {
        self.download_path.clone().unwrap_or_else(|| app_dir.join("downloads"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookStage {
    Pre,
    Post,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Pre => write!(f, "pre"),
            HookStage::Post => write!(f, "post"),
        }
    }
}

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineResult {
    Downloaded,
    DownloadedAndExtracted,
    DownloadButExtractFailed,
    GitCloned,
    ChecksumMismatch,
    DownloadFailed,
    GitFailed,
    InvalidUrl,
    PreHookFailed,
}

impl PipelineResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineResult::Downloaded => "downloaded",
            PipelineResult::DownloadedAndExtracted => "downloaded_and_extracted",
            PipelineResult::DownloadButExtractFailed => "download_but_extract_failed",
            PipelineResult::GitCloned => "git_cloned",
            PipelineResult::ChecksumMismatch => "checksum_mismatch",
            PipelineResult::DownloadFailed => "download_failed",
            PipelineResult::GitFailed => "git_failed",
            PipelineResult::InvalidUrl => "invalid_url",
            PipelineResult::PreHookFailed => "pre_hook_failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            PipelineResult::Downloaded | PipelineResult::DownloadedAndExtracted | PipelineResult::GitCloned
        )
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// What [`crate::Pipeline::run`] hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub result:       PipelineResult,
    pub reason:       Option<String>,
    pub path:         Option<PathBuf>,
    /// `false` only when a post-hook ran and failed.
    pub post_hook_ok: bool,
}

impl Report {
    pub fn new(result: PipelineResult) -> Self {
        Self {
            result,
            reason: None,
            path: None,
            post_hook_ok: true,
        }
    }

    pub fn reason(mut self, reason: impl fmt::Display) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn is_success(&self) -> bool { self.result.is_success() }
}

/// Which transfer a URL will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Clone,
    Download,
}

impl Branch {
    pub fn for_kind(kind: UrlKind) -> Option<Self> {
        match kind {
            UrlKind::Vcs => Some(Branch::Clone),
            UrlKind::File | UrlKind::Unknown => Some(Branch::Download),
            UrlKind::Error => None,
        }
    }
}

/// Dry-run answer: how a project would be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub probe:  ProbeResult,
    pub branch: Option<Branch>,
    pub target: Option<PathBuf>,
}

/// One line of the download log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    pub project:   String,
    pub url:       String,
    pub result:    PipelineResult,
    pub path:      String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info:      Option<String>,
}

impl AuditRecord {
    pub fn from_report(project: &Project, report: &Report) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            project:   project.name.clone(),
            url:       project.url.clone(),
            result:    report.result,
            path:      report
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            info:      report.reason.clone(),
        }
    }
}
