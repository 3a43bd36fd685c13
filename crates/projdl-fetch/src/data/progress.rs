use crate::data::options::FetchPhase;

/// Snapshot handed to progress callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub phase: FetchPhase,

    /// Bytes on disk, including any resumed prefix.
    pub bytes_downloaded: u64,

    /// Total expected bytes, if the server announced a length.
    pub total_bytes: Option<u64>,

    /// Current retry attempt (0 = first attempt).
    pub retry_count: u32,
}

impl Progress {
    /// Percentage of completion; `None` if the total is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                if self.is_completed() { 100.0 } else { 0.0 }
            } else {
                (self.bytes_downloaded as f64 / total as f64) * 100.0
            }
        })
    }

    #[must_use]
    pub fn is_completed(&self) -> bool { self.phase == FetchPhase::Completed }

    #[must_use]
    pub fn is_retrying(&self) -> bool { self.retry_count > 0 }
}
