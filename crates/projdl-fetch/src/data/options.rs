use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::progress::Progress;

/// Phases of a transfer.
///
/// Retries return to the Connecting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Connecting,
    Downloading,
    Completed,
}

impl std::fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Per-transfer behaviour.
///
/// # Examples
///
/// ```
/// use projdl_fetch::TransferOptions;
///
/// let options = TransferOptions::default().retries(5).bandwidth_limit(64 * 1024);
/// assert_eq!(options.retries, 5);
/// ```
#[derive(Clone)]
pub struct TransferOptions {
    /// Additional attempts after the first one fails.
    ///
    /// Total attempts = 1 + retries. Default: 2
    pub retries: u32,

    /// Fixed pause between attempts.
    ///
    /// Default: 1s
    pub retry_backoff: Duration,

    /// Average bytes per second written to disk; 0 disables throttling.
    pub bandwidth_limit: u64,

    /// Invoked on phase transitions and after every chunk write.
    pub on_progress: Option<ProgressFn>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            retries:         2,
            retry_backoff:   Duration::from_secs(1),
            bandwidth_limit: 0,
            on_progress:     None,
        }
    }
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("retries", &self.retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("bandwidth_limit", &self.bandwidth_limit)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl TransferOptions {
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn bandwidth_limit(mut self, bytes_per_sec: u64) -> Self {
        self.bandwidth_limit = bytes_per_sec;
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(&progress);
        }
    }
}
