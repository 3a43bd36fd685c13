//! Application directory, configuration and catalog.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use projdl_fetch::{HttpClient, ReqwestClient};
use projdl_fs::{AtomicWriteOptions, atomic_write, read_optional};
use projdl_pipeline::{Config, Project, ValidationCache};
use projdl_platform::dir::AppPaths;

pub struct AppEnv {
    pub paths:  AppPaths,
    pub config: Config,
}

impl AppEnv {
    /// Resolve the application directory and load (or create) its config.
    pub fn load() -> Result<Self> {
        let paths = AppPaths::discover().context("cannot locate the application directory")?;
        Self::load_from(paths)
    }

    pub fn load_from(paths: AppPaths) -> Result<Self> {
        let config = load_config(&paths.config_file())?;
        Ok(Self { paths, config })
    }

    pub fn download_root(&self) -> PathBuf { self.config.download_root(self.paths.root()) }

    pub fn catalog_file(&self) -> PathBuf {
        self.config
            .projects_file
            .clone()
            .unwrap_or_else(|| self.paths.catalog_file())
    }

    pub fn client(&self) -> Result<ReqwestClient> {
        ReqwestClient::new(&self.config.client_settings()).context("failed to build HTTP client")
    }

    pub fn validation_cache(&self) -> ValidationCache {
        ValidationCache::new(
            self.paths.validation_cache(),
            Duration::from_secs(self.config.validate_cache_ttl),
        )
    }

    /// The remote catalog when `projects_url` is set, the local file otherwise.
    pub async fn load_catalog<C: HttpClient>(&self, client: &C) -> Result<Vec<Project>> {
        match self.config.projects_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => fetch_catalog(client, url).await,
            None => load_local_catalog(&self.catalog_file()),
        }
    }
}

/// Parse `path`, writing the defaults there first if it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if let Some(bytes) = read_optional(path)? {
        let text = String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8", path.display()))?;
        return toml::from_str(&text).with_context(|| format!("malformed config {}", path.display()));
    }

    let config = Config::default();
    let text = toml::to_string_pretty(&config)?;
    atomic_write(path, text.as_bytes(), AtomicWriteOptions::new().create_dirs(true))?;
    tracing::info!(path = %path.display(), "created default config");
    Ok(config)
}

/// Read the catalog at `path`; a missing file is created empty.
pub fn load_local_catalog(path: &Path) -> Result<Vec<Project>> {
    match read_optional(path)? {
        Some(bytes) => serde_json::from_slice(&bytes).with_context(|| format!("malformed catalog {}", path.display())),
        None => {
            atomic_write(path, b"[]", AtomicWriteOptions::new().create_dirs(true))?;
            tracing::info!(path = %path.display(), "created empty catalog");
            Ok(Vec::new())
        }
    }
}

pub async fn fetch_catalog<C: HttpClient>(client: &C, url: &str) -> Result<Vec<Project>> {
    let response = client.get(url, &[]).await?;
    if !response.head.is_success() {
        bail!("catalog request to {url} returned HTTP {}", response.head.status);
    }

    let mut body = Vec::new();
    let mut stream = response.body;
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);
    }
    tracing::debug!(url, bytes = body.len(), "fetched remote catalog");
    serde_json::from_slice(&body).with_context(|| format!("malformed catalog from {url}"))
}
