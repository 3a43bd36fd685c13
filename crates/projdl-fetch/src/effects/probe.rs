use url::Url;

use crate::core::classify_response;
use crate::data::ProbeResult;
use crate::effects::http::HttpClient;

/// Probe `url` with HEAD, falling back to GET when HEAD cannot be sent.
///
/// The GET body is dropped as soon as the headers are in.
pub async fn probe<C: HttpClient>(client: &C, url: &str) -> ProbeResult {
    let url = url.trim();
    if let Err(e) = Url::parse(url) {
        return ProbeResult::failed(None, format!("invalid URL: {e}"));
    }

    match client.head(url).await {
        Ok(head) => classify_response(url, &head),
        Err(head_err) => {
            tracing::debug!(url, error = %head_err, "HEAD failed; retrying probe with GET");
            match client.get(url, &[]).await {
                Ok(response) => {
                    let head = response.head;
                    drop(response.body);
                    classify_response(url, &head)
                }
                Err(e) => ProbeResult::failed(None, e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ResponseHead, UrlKind};
    use crate::effects::mock::{Reply, ScriptedClient};

    #[tokio::test]
    async fn test_head_success() {
        let client = ScriptedClient::new().on_head(Reply::ok(
            ResponseHead::new(200).with_header("Content-Type", "application/zip"),
            b"",
        ));
        let result = probe(&client, "https://example.com/file.zip").await;
        assert!(result.ok);
        assert_eq!(result.kind, UrlKind::File);
        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_get() {
        let client = ScriptedClient::new()
            .on_head(Reply::Fail("connection reset".into()))
            .on_get(Reply::ok(ResponseHead::new(200).with_header("Content-Type", "text/html"), b"<html>"));
        let result = probe(&client, "https://example.com/").await;
        assert!(result.ok);
        assert_eq!(result.kind, UrlKind::Unknown);
        assert_eq!(client.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_both_requests_failing() {
        let client = ScriptedClient::new()
            .on_head(Reply::Fail("dns".into()))
            .on_get(Reply::Fail("dns again".into()));
        let result = probe(&client, "https://nowhere.invalid/").await;
        assert!(!result.ok);
        assert_eq!(result.kind, UrlKind::Error);
        assert!(result.reason.contains("dns again"));
    }

    #[tokio::test]
    async fn test_http_error_does_not_fall_back() {
        let client = ScriptedClient::new().on_head(Reply::ok(ResponseHead::new(404), b""));
        let result = probe(&client, "https://example.com/missing").await;
        assert!(!result.ok);
        assert_eq!(result.status_code, Some(404));
        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_url_skips_network() {
        let client = ScriptedClient::new();
        let result = probe(&client, "not a url").await;
        assert!(!result.ok);
        assert!(result.reason.starts_with("invalid URL"));
    }
}
