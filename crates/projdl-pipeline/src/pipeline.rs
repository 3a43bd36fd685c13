//! The download orchestrator.
//!
//! One run walks a project through
//! `pre-hook -> classify -> clone | download -> verify -> unpack -> post-hook`
//! and stops at the first failing stage. Every run ends with a webhook
//! notification and a [`Report`]; no error escapes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use projdl_fetch::{
    clone_repository, probe, transfer_file, HttpClient, ProbeResult, Progress, ProgressFn, TransferOptions, UrlKind,
};
use projdl_verify::Sha256Digest;

use crate::cache::ValidationCache;
use crate::data::{Branch, Config, HookStage, PipelineResult, Plan, Project, Report};
use crate::error::Result;
use crate::hooks::{run_hook, HookRunner, ShellHookRunner};
use crate::{layout, notify};

pub struct Pipeline<C: HttpClient> {
    client:        C,
    config:        Config,
    download_root: PathBuf,
    cache:         Option<Mutex<ValidationCache>>,
    hooks:         Arc<dyn HookRunner>,
    on_progress:   Option<ProgressFn>,
}

impl<C: HttpClient> Pipeline<C> {
    pub fn new(client: C, config: Config, download_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            config,
            download_root: download_root.into(),
            cache: None,
            hooks: Arc::new(ShellHookRunner::default()),
            on_progress: None,
        }
    }

    /// Consult and update `cache` when classifying.
    pub fn cache(mut self, cache: ValidationCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    pub fn hooks(mut self, runner: impl HookRunner + 'static) -> Self {
        self.hooks = Arc::new(runner);
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn download_root(&self) -> &Path { &self.download_root }

    pub fn client(&self) -> &C { &self.client }

    fn with_cache<R>(&self, f: impl FnOnce(&mut ValidationCache) -> R) -> Option<R> {
        let cache = self.cache.as_ref()?;
        let mut guard = match cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Some(f(&mut guard))
    }

    fn save_cache(cache: &mut ValidationCache) {
        if let Err(e) = cache.save() {
            tracing::warn!(path = %cache.path().display(), error = %e, "failed to save validation cache");
        }
    }

    /// Probe `url`, answering from the cache while a successful entry is fresh.
    pub async fn classify(&self, url: &str) -> ProbeResult {
        if let Some(hit) = self.with_cache(|c| c.lookup(url)).flatten().filter(|p| p.ok) {
            tracing::debug!(url, kind = %hit.kind, "classification cache hit");
            return hit;
        }

        let result = probe(&self.client, url).await;
        tracing::info!(url, ok = result.ok, kind = %result.kind, reason = %result.reason, "classified");
        self.with_cache(|c| {
            c.store(url, &result);
            Self::save_cache(c);
        });
        result
    }

    /// Probe every project's URL, bypassing cached answers, and refresh the
    /// cache with the results.
    pub async fn validate(&self, projects: &[Project]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(projects.len());
        for project in projects {
            let url = project.url.trim();
            let result = if url.is_empty() {
                ProbeResult::failed(None, "no url")
            } else {
                let result = probe(&self.client, url).await;
                self.with_cache(|c| c.store(url, &result));
                result
            };
            results.push(result);
        }
        self.with_cache(Self::save_cache);
        results
    }

    /// Dry run: classify and report where the project would go, without
    /// running hooks or transferring anything.
    pub async fn plan(&self, project: &Project) -> Plan {
        let url = project.url.trim();
        if url.is_empty() {
            return Plan {
                probe:  ProbeResult::failed(None, "project has no download URL"),
                branch: None,
                target: None,
            };
        }

        let probe = self.classify(url).await;
        let branch = if probe.ok { Branch::for_kind(probe.kind) } else { None };
        let target = branch.map(|branch| match branch {
            Branch::Clone => layout::clone_target(&self.download_root, &project.name),
            Branch::Download => layout::file_target(&self.download_root, &project.name, url),
        });
        Plan { probe, branch, target }
    }

    /// Fetch `project` and notify the webhook with the outcome.
    pub async fn run(&self, project: &Project) -> Report {
        let report = self.execute(project).await;
        tracing::info!(
            project = %project.name,
            result = %report.result,
            reason = report.reason.as_deref().unwrap_or(""),
            "pipeline finished"
        );

        let body = notify::payload(project, &report);
        notify::notify(&self.client, self.config.webhook(), &body).await;
        report
    }

    async fn execute(&self, project: &Project) -> Report {
        let url = project.url.trim();
        if url.is_empty() {
            return Report::new(PipelineResult::InvalidUrl).reason("project has no download URL");
        }

        let expected = match project.expected_sha256().map(str::parse::<Sha256Digest>).transpose() {
            Ok(expected) => expected,
            Err(e) => return Report::new(PipelineResult::ChecksumMismatch).reason(e),
        };

        if let Err(e) = run_hook(&self.hooks, project, HookStage::Pre).await {
            return Report::new(PipelineResult::PreHookFailed).reason(e);
        }

        let probe = self.classify(url).await;
        if !probe.ok {
            return Report::new(PipelineResult::InvalidUrl).reason(probe.reason);
        }

        if probe.kind == UrlKind::Vcs {
            self.clone_project(project, url).await
        } else {
            self.download_project(project, url, expected).await
        }
    }

    async fn clone_project(&self, project: &Project, url: &str) -> Report {
        let target = layout::clone_target(&self.download_root, &project.name);
        match self.clone_into(url, &target).await {
            Ok(()) => {
                let report = Report::new(PipelineResult::GitCloned).path(&target);
                self.post_hook(project, report).await
            }
            Err(e) => Report::new(PipelineResult::GitFailed).reason(e).path(&target),
        }
    }

    async fn clone_into(&self, url: &str, target: &Path) -> Result<()> {
        tokio::fs::create_dir_all(&self.download_root).await?;
        clone_repository(url, target, &self.config.clone_options()).await?;
        Ok(())
    }

    async fn download_project(&self, project: &Project, url: &str, expected: Option<Sha256Digest>) -> Report {
        let dest = layout::file_target(&self.download_root, &project.name, url);
        tracing::info!(url, dest = %dest.display(), "downloading");

        if let Err(e) = transfer_file(&self.client, url, &dest, &self.transfer_options()).await {
            return Report::new(PipelineResult::DownloadFailed).reason(e).path(&dest);
        }

        let report = self.finish_download(project, dest, expected).await;
        self.post_hook(project, report).await
    }

    async fn finish_download(&self, project: &Project, dest: PathBuf, expected: Option<Sha256Digest>) -> Report {
        if let Some(expected) = expected {
            if let Err(e) = verify(dest.clone(), expected).await {
                tracing::warn!(path = %dest.display(), error = %e, "checksum verification failed");
                return Report::new(PipelineResult::ChecksumMismatch).reason(e).path(dest);
            }
            tracing::info!(path = %dest.display(), "checksum ok");
        }

        if !projdl_archive::is_archive(&dest) {
            return Report::new(PipelineResult::Downloaded).path(dest);
        }

        let out = projdl_archive::extraction_dir(&dest, Some(&layout::sanitize_name(&project.name)));
        match unpack(dest.clone(), out.clone()).await {
            Ok(()) => Report::new(PipelineResult::DownloadedAndExtracted).path(out),
            Err(e) => {
                tracing::warn!(path = %dest.display(), error = %e, "extraction failed");
                Report::new(PipelineResult::DownloadButExtractFailed).reason(e).path(dest)
            }
        }
    }

    async fn post_hook(&self, project: &Project, mut report: Report) -> Report {
        if run_hook(&self.hooks, project, HookStage::Post).await.is_err() {
            report.post_hook_ok = false;
        }
        report
    }

    fn transfer_options(&self) -> TransferOptions {
        let mut options = self.config.transfer_options();
        options.on_progress = self.on_progress.clone();
        options
    }
}

async fn verify(path: PathBuf, expected: Sha256Digest) -> Result<()> {
    tokio::task::spawn_blocking(move || projdl_verify::verify_file(&path, &expected)).await??;
    Ok(())
}

async fn unpack(archive: PathBuf, dest: PathBuf) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || projdl_archive::extract(&archive, &dest)).await??;
    tracing::debug!(entries = report.entry_count, bytes = report.total_bytes, "unpacked");
    Ok(())
}
