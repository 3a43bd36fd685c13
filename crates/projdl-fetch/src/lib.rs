//! URL probing, resumable throttled HTTP transfer and repository cloning.
//!
//! # Architecture
//!
//! - [`data`] - Settings, options, probe results and progress snapshots
//! - `core` - Pure decisions (classification, ranges, retries, token bucket)
//! - `effects` - I/O behind the [`HttpClient`] trait
//!
//! The caller owns policy: what to do with a probe result, where files go and
//! how progress is shown.

mod core;
pub mod data;
mod effects;
mod error;

pub use self::core::{
    accepts_token, classify_response, content_range_start, content_range_total, is_vcs_host, looks_like_repository, range_header, resume_decision,
    ResumeDecision, RetryPolicy, TokenBucket,
};
pub use data::{ClientSettings, FetchPhase, ProbeResult, Progress, ProgressFn, ResponseHead, TransferOptions, UrlKind};
pub use effects::{
    authenticated_url, clone_repository, probe, transfer_file, BodyStream, BoxStream, CloneOptions, HttpClient,
    Response, TransferState, CHUNK_SIZE,
};
#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;
pub use error::{FetchError, Result};
