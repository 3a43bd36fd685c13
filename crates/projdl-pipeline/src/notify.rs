use projdl_fetch::HttpClient;
use serde_json::{json, Value};

use crate::data::{Project, Report};

/// Webhook body for a finished run.
pub fn payload(project: &Project, report: &Report) -> Value {
    let mut body = json!({
        "event": "download",
        "project": project.name,
        "url": project.url,
        "result": report.result,
    });
    if let Some(path) = &report.path {
        body["path"] = json!(path.display().to_string());
    }
    if let Some(reason) = &report.reason {
        body["info"] = json!(reason);
    }
    body
}

/// POST `payload` to `webhook`. Failures are logged and swallowed.
///
/// Returns `false` when no webhook is configured or delivery failed.
pub async fn notify<C: HttpClient>(client: &C, webhook: Option<&str>, payload: &Value) -> bool {
    let Some(webhook) = webhook else {
        return false;
    };
    match client.post_json(webhook, payload).await {
        Ok(status) if (200..300).contains(&status) => true,
        Ok(status) => {
            tracing::warn!(status, "webhook rejected notification");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "webhook notification failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PipelineResult;

    #[test]
    fn test_payload_fields() {
        let project = Project::new("demo", "https://example.com/file.zip");
        let report = Report::new(PipelineResult::DownloadedAndExtracted).path("/dl/demo/demo_extracted");
        let body = payload(&project, &report);
        assert_eq!(body["event"], "download");
        assert_eq!(body["project"], "demo");
        assert_eq!(body["result"], "downloaded_and_extracted");
        assert_eq!(body["path"], "/dl/demo/demo_extracted");
        assert!(body.get("info").is_none());
    }

    #[test]
    fn test_payload_carries_reason() {
        let project = Project::new("demo", "https://example.com/");
        let report = Report::new(PipelineResult::InvalidUrl).reason("HTTP error 404");
        let body = payload(&project, &report);
        assert_eq!(body["info"], "HTTP error 404");
        assert!(body.get("path").is_none());
    }
}
