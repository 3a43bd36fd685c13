use std::io;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::core::{expected_total, range_header, resume_decision, ResumeDecision, RetryPolicy, TokenBucket};
use crate::data::{FetchPhase, Progress, TransferOptions};
use crate::effects::http::{BodyStream, HttpClient};
use crate::error::{FetchError, Result};

/// Bytes written (and throttled) per step.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Where a finished transfer left the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferState {
    pub destination:           PathBuf,
    /// Bytes kept from an earlier partial download.
    pub bytes_already_present: u64,
    pub total_expected:        Option<u64>,
    pub resumed:               bool,
    /// Size of the file on disk when the transfer finished.
    pub bytes_on_disk:         u64,
}

/// Download `url` into `destination`, resuming a partial file if one exists.
///
/// Transport failures are retried with a fixed delay; each retry resumes from
/// whatever is on disk. After the last attempt the partial file is left in
/// place for a later run.
pub async fn transfer_file<C: HttpClient>(
    client: &C,
    url: &str,
    destination: &Path,
    options: &TransferOptions,
) -> Result<TransferState> {
    let policy = RetryPolicy::new(options.retries, options.retry_backoff);
    let mut bucket = (options.bandwidth_limit > 0)
        .then(|| TokenBucket::new(options.bandwidth_limit, CHUNK_SIZE as u64, Instant::now()));

    let mut attempt = 0;
    loop {
        match attempt_once(client, url, destination, options, &mut bucket, attempt).await {
            Ok(state) => return Ok(state),
            Err(e) => match policy.next_delay(attempt, &e) {
                Some(delay) => {
                    tracing::warn!(url, attempt = attempt + 1, error = %e, "transfer attempt failed; retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None if e.is_retryable() => {
                    tracing::warn!(url, attempts = attempt + 1, error = %e, "giving up on transfer");
                    return Err(FetchError::MaxRetriesExceeded {
                        count: attempt + 1,
                        last:  e.to_string(),
                    });
                }
                None => return Err(e),
            },
        }
    }
}

async fn attempt_once<C: HttpClient>(
    client: &C,
    url: &str,
    destination: &Path,
    options: &TransferOptions,
    bucket: &mut Option<TokenBucket>,
    attempt: u32,
) -> Result<TransferState> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut existing = file_len(destination).await?;
    loop {
        report(options, FetchPhase::Connecting, existing, None, attempt);
        let headers: Vec<_> = range_header(existing).into_iter().collect();
        let response = client.get(url, &headers).await?;
        let decision = resume_decision(existing, &response.head)?;
        let total = expected_total(decision, existing, &response.head);
        tracing::debug!(url, status = response.head.status, existing, ?decision, "transfer response");

        match decision {
            ResumeDecision::AlreadyComplete => {
                report(options, FetchPhase::Completed, existing, total, attempt);
                return Ok(TransferState {
                    destination:           destination.to_path_buf(),
                    bytes_already_present: existing,
                    total_expected:        total,
                    resumed:               true,
                    bytes_on_disk:         existing,
                });
            }
            // A rejected or misaligned range is no usable start; ask again without one.
            ResumeDecision::Restart if matches!(response.head.status, 206 | 416) => {
                tracing::info!(url, existing, status = response.head.status, "range not honoured; restarting from zero");
                File::create(destination).await?;
                existing = 0;
                continue;
            }
            ResumeDecision::Restart => {
                tracing::info!(url, existing, "server ignored range; restarting from zero");
            }
            ResumeDecision::Fresh | ResumeDecision::Append => {}
        }

        let append = decision == ResumeDecision::Append;
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(destination)
            .await?;

        let kept = if append { existing } else { 0 };
        let mut written = kept;
        let streamed = write_body(response.body, &mut file, &mut written, bucket, |done| {
            report(options, FetchPhase::Downloading, done, total, attempt)
        })
        .await;
        // Flush before surfacing a body error so the next attempt sees every byte.
        file.flush().await?;
        streamed?;

        report(options, FetchPhase::Completed, written, total, attempt);
        return Ok(TransferState {
            destination:           destination.to_path_buf(),
            bytes_already_present: kept,
            total_expected:        total,
            resumed:               append,
            bytes_on_disk:         written,
        });
    }
}

async fn write_body(
    mut body: BodyStream,
    file: &mut File,
    written: &mut u64,
    bucket: &mut Option<TokenBucket>,
    on_chunk: impl Fn(u64),
) -> Result<()> {
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for piece in chunk.chunks(CHUNK_SIZE) {
            if let Some(bucket) = bucket.as_mut() {
                bucket.acquire(piece.len() as u64).await;
            }
            file.write_all(piece).await?;
            *written += piece.len() as u64;
            on_chunk(*written);
        }
    }
    Ok(())
}

async fn file_len(path: &Path) -> Result<u64> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn report(options: &TransferOptions, phase: FetchPhase, done: u64, total: Option<u64>, attempt: u32) {
    options.report(Progress {
        phase,
        bytes_downloaded: done,
        total_bytes: total,
        retry_count: attempt,
    });
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::data::ResponseHead;
    use crate::effects::mock::{Reply, ScriptedClient};

    const URL: &str = "https://example.com/file.bin";

    fn payload(len: usize) -> Vec<u8> { (0..len).map(|i| (i * 7 % 256) as u8).collect() }

    fn fast(retries: u32) -> TransferOptions {
        TransferOptions::default()
            .retries(retries)
            .retry_backoff(Duration::from_millis(1))
    }

    fn full(data: &[u8]) -> Reply {
        Reply::ok(
            ResponseHead::new(200).with_header("Content-Length", data.len().to_string()),
            data,
        )
    }

    fn partial(data: &[u8], from: usize) -> Reply {
        Reply::ok(
            ResponseHead::new(206)
                .with_header("Content-Length", (data.len() - from).to_string())
                .with_header("Content-Range", format!("bytes {from}-{}/{}", data.len() - 1, data.len())),
            &data[from..],
        )
    }

    #[tokio::test]
    async fn test_fresh_download() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/file.bin");
        let data = payload(20_000);
        let client = ScriptedClient::new().on_get(full(&data));

        let state = transfer_file(&client, URL, &dest, &fast(0)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
        assert!(!state.resumed);
        assert_eq!(state.total_expected, Some(20_000));
        assert!(client.get_requests()[0].is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_stream_resumes_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(50_000);
        let cut = 12_345;

        let client = ScriptedClient::new()
            .on_get(Reply::Respond {
                head:   ResponseHead::new(200).with_header("Content-Length", "50000"),
                chunks: vec![Ok(data[..cut].to_vec()), Err("connection reset".into())],
            })
            .on_get(partial(&data, cut));

        let state = transfer_file(&client, URL, &dest, &fast(2)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
        assert!(state.resumed);
        assert_eq!(state.bytes_already_present, cut as u64);
        assert_eq!(state.total_expected, Some(50_000));

        let requests = client.get_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], vec![("Range".to_string(), format!("bytes={cut}-"))]);
    }

    #[tokio::test]
    async fn test_existing_partial_file_is_resumed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(30_000);
        std::fs::write(&dest, &data[..10_000]).unwrap();

        let client = ScriptedClient::new().on_get(partial(&data, 10_000));
        transfer_file(&client, URL, &dest, &fast(0)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
    }

    #[tokio::test]
    async fn test_full_reply_to_range_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(9_000);
        std::fs::write(&dest, b"stale partial bytes").unwrap();

        let client = ScriptedClient::new().on_get(full(&data));
        let state = transfer_file(&client, URL, &dest, &fast(0)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
        assert!(!state.resumed);
        assert_eq!(state.bytes_already_present, 0);
    }

    #[tokio::test]
    async fn test_unsatisfiable_range_at_end_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(4_000);
        std::fs::write(&dest, &data).unwrap();

        let client = ScriptedClient::new().on_get(Reply::ok(
            ResponseHead::new(416).with_header("Content-Range", "bytes */4000"),
            b"",
        ));
        let state = transfer_file(&client, URL, &dest, &fast(0)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
        assert_eq!(state.bytes_on_disk, 4_000);
        assert_eq!(client.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_range_restarts_without_range() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(3_000);
        std::fs::write(&dest, payload(5_000)).unwrap();

        let client = ScriptedClient::new()
            .on_get(Reply::ok(
                ResponseHead::new(416).with_header("Content-Range", "bytes */3000"),
                b"",
            ))
            .on_get(full(&data));
        transfer_file(&client, URL, &dest, &fast(0)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
        let requests = client.get_requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].is_empty());
    }

    #[tokio::test]
    async fn test_partial_content_from_wrong_offset_is_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(1_000);
        std::fs::write(&dest, &data[..400]).unwrap();

        let client = ScriptedClient::new()
            .on_get(Reply::ok(
                ResponseHead::new(206)
                    .with_header("Content-Length", "1000")
                    .with_header("Content-Range", "bytes 0-999/1000"),
                &data,
            ))
            .on_get(full(&data));
        let state = transfer_file(&client, URL, &dest, &fast(0)).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), data);
        assert!(!state.resumed);
        let requests = client.get_requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].is_empty());
    }

    #[tokio::test]
    async fn test_attempts_bounded_by_retries() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let mut client = ScriptedClient::new();
        for _ in 0..10 {
            client = client.on_get(Reply::Fail("refused".into()));
        }

        let result = transfer_file(&client, URL, &dest, &fast(2)).await;

        assert!(matches!(result, Err(FetchError::MaxRetriesExceeded { count: 3, .. })));
        assert_eq!(client.get_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_http_error_is_retried_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let client = ScriptedClient::new()
            .on_get(Reply::ok(ResponseHead::new(503), b""))
            .on_get(Reply::ok(ResponseHead::new(503), b""));

        let result = transfer_file(&client, URL, &dest, &fast(1)).await;
        assert!(result.is_err());
        assert_eq!(client.get_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_keep_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(10_000);
        let client = ScriptedClient::new().on_get(Reply::Respond {
            head:   ResponseHead::new(200),
            chunks: vec![Ok(data[..4_000].to_vec()), Err("eof".into())],
        });

        assert!(transfer_file(&client, URL, &dest, &fast(0)).await.is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), &data[..4_000]);
    }

    #[tokio::test]
    async fn test_progress_reports_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(CHUNK_SIZE * 2 + 100);
        let client = ScriptedClient::new().on_get(full(&data));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = fast(0).on_progress(move |p| sink.lock().unwrap().push((p.phase, p.bytes_downloaded)));
        transfer_file(&client, URL, &dest, &options).await.unwrap();

        let seen = seen.lock().unwrap();
        let downloading: Vec<u64> = seen
            .iter()
            .filter(|(phase, _)| *phase == FetchPhase::Downloading)
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(downloading, vec![CHUNK_SIZE as u64, CHUNK_SIZE as u64 * 2, data.len() as u64]);
        assert_eq!(seen.last().map(|(phase, _)| *phase), Some(FetchPhase::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bandwidth_limit_bounds_duration() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.bin");
        let data = payload(100 * 1024);
        let client = ScriptedClient::new().on_get(full(&data));

        let start = Instant::now();
        let options = fast(0).bandwidth_limit(1000);
        transfer_file(&client, URL, &dest, &options).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(100));
        assert_eq!(std::fs::read(&dest).unwrap(), data);
    }
}
