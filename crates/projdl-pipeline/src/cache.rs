//! Persistent probe results keyed by URL.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use projdl_fetch::{ProbeResult, UrlKind};
use projdl_fs::AtomicWriteOptions;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub ok:          bool,
    #[serde(rename = "type")]
    pub kind:        UrlKind,
    pub reason:      String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Unix seconds at which the probe was stored.
    pub ts:          f64,
}

impl CacheEntry {
    fn probe(&self) -> ProbeResult {
        ProbeResult {
            ok:          self.ok,
            kind:        self.kind,
            status_code: self.status_code,
            reason:      self.reason.clone(),
        }
    }
}

/// Probe cache backed by a JSON file.
///
/// The file is read on the first lookup and written by [`ValidationCache::save`].
#[derive(Debug)]
pub struct ValidationCache {
    path:    PathBuf,
    ttl:     Duration,
    entries: Option<BTreeMap<String, CacheEntry>>,
    dirty:   bool,
}

pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl ValidationCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            entries: None,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn entries(&mut self) -> &mut BTreeMap<String, CacheEntry> {
        let path = &self.path;
        self.entries.get_or_insert_with(|| match load(path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable validation cache");
                BTreeMap::new()
            }
        })
    }

    /// Cached probe for `url`, unless missing or older than the TTL.
    pub fn lookup(&mut self, url: &str) -> Option<ProbeResult> { self.lookup_at(url, unix_now()) }

    pub fn lookup_at(&mut self, url: &str, now: f64) -> Option<ProbeResult> {
        let ttl = self.ttl.as_secs_f64();
        let entry = self.entries().get(url)?;
        if now - entry.ts > ttl {
            tracing::debug!(url, "validation cache entry expired");
            return None;
        }
        Some(entry.probe())
    }

    pub fn store(&mut self, url: &str, probe: &ProbeResult) { self.store_at(url, probe, unix_now()) }

    pub fn store_at(&mut self, url: &str, probe: &ProbeResult, now: f64) {
        let entry = CacheEntry {
            ok:          probe.ok,
            kind:        probe.kind,
            reason:      probe.reason.clone(),
            status_code: probe.status_code,
            ts:          now,
        };
        self.entries().insert(url.to_string(), entry);
        self.dirty = true;
    }

    /// Persist pending changes atomically. A no-op when nothing changed.
    pub fn save(&mut self) -> Result<(), CacheError> {
        let Some(entries) = self.entries.as_ref().filter(|_| self.dirty) else {
            return Ok(());
        };
        let content = serde_json::to_vec_pretty(entries)?;
        projdl_fs::atomic_write(&self.path, &content, AtomicWriteOptions::new().create_dirs(true))?;
        self.dirty = false;
        Ok(())
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, CacheEntry>, CacheError> {
    match projdl_fs::read_optional(path)? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(BTreeMap::new()),
    }
}
