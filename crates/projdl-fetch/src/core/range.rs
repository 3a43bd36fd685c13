use crate::data::ResponseHead;
use crate::error::{FetchError, Result};

/// How the bytes of a response relate to what is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// Nothing was on disk; write from byte 0.
    Fresh,
    /// Partial content; append after the existing bytes.
    Append,
    /// The server says the range starts at the end of the file.
    AlreadyComplete,
    /// The range was ignored, rejected or answered from another offset;
    /// truncate and start over.
    Restart,
}

/// `Range` header resuming after `existing` bytes, if there are any.
pub fn range_header(existing: u64) -> Option<(String, String)> {
    (existing > 0).then(|| ("Range".to_string(), format!("bytes={existing}-")))
}

/// Decide what to do with a response to a request resuming from `existing`.
pub fn resume_decision(existing: u64, head: &ResponseHead) -> Result<ResumeDecision> {
    match head.status {
        206 if existing > 0 => {
            if content_range_start(head) == Some(existing) {
                Ok(ResumeDecision::Append)
            } else {
                Ok(ResumeDecision::Restart)
            }
        }
        200..=299 if existing > 0 => Ok(ResumeDecision::Restart),
        200..=299 => Ok(ResumeDecision::Fresh),
        416 if existing > 0 => {
            if content_range_total(head) == Some(existing) {
                Ok(ResumeDecision::AlreadyComplete)
            } else {
                Ok(ResumeDecision::Restart)
            }
        }
        status => Err(FetchError::HttpStatus { status }),
    }
}

/// Complete size of the resource once the response has been written.
pub fn expected_total(decision: ResumeDecision, existing: u64, head: &ResponseHead) -> Option<u64> {
    match decision {
        ResumeDecision::Append => content_range_total(head).or_else(|| head.content_length().map(|len| len + existing)),
        ResumeDecision::AlreadyComplete => Some(existing),
        ResumeDecision::Fresh | ResumeDecision::Restart => head.content_length(),
    }
}

/// First byte offset from `Content-Range: bytes <start>-<end>/<total>`.
pub fn content_range_start(head: &ResponseHead) -> Option<u64> {
    let value = head.header("content-range")?.trim();
    let rest = value.strip_prefix("bytes")?.trim_start();
    let (start, _) = rest.split_once('-')?;
    start.trim().parse().ok()
}

/// The complete length from `Content-Range: bytes <range>/<total>`.
pub fn content_range_total(head: &ResponseHead) -> Option<u64> {
    let value = head.header("content-range")?.trim();
    let rest = value.strip_prefix("bytes")?.trim_start();
    let (_, total) = rest.rsplit_once('/')?;
    total.trim().parse().ok()
}
