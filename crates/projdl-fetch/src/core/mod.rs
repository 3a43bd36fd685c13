//! Pure decisions: URL classification, range handling, retry budget and
//! bandwidth accounting. Nothing in here performs I/O.

mod bandwidth;
mod classify;
mod range;
mod retry;

pub use bandwidth::TokenBucket;
pub use classify::{accepts_token, classify_response, is_vcs_host, looks_like_repository};
pub use range::{content_range_start, content_range_total, expected_total, range_header, resume_decision, ResumeDecision};
pub use retry::RetryPolicy;
