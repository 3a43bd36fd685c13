use std::path::Path;

use projdl_platform::command::Command;

use crate::core::accepts_token;
use crate::error::{FetchError, Result};

#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Executable used for `clone`. Default: `git`
    pub git_program: String,
    pub auth_token:  Option<String>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            auth_token:  None,
        }
    }
}

/// Embed `token` as URL credentials for `https://` URLs on the hosting domain.
///
/// Any other URL is returned unchanged.
pub fn authenticated_url(url: &str, token: Option<&str>) -> String {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return url.to_string();
    };
    match url.strip_prefix("https://") {
        Some(rest) if accepts_token(url) => format!("https://{token}@{rest}"),
        _ => url.to_string(),
    }
}

/// Run `<git> clone <url> <destination>` with inherited stdio.
///
/// A missing program or a non-zero exit is an error; there is no retry.
pub async fn clone_repository(url: &str, destination: &Path, options: &CloneOptions) -> Result<()> {
    let remote = authenticated_url(url, options.auth_token.as_deref());
    tracing::info!(url, dest = %destination.display(), "cloning repository");

    let program = options.git_program.clone();
    let dest = destination.to_path_buf();
    let status = tokio::task::spawn_blocking(move || Command::new(program).arg("clone").arg(remote).arg(dest).status())
        .await
        .map_err(|e| FetchError::CloneFailed(e.to_string()))??;

    if status.success() {
        Ok(())
    } else {
        Err(FetchError::CloneFailed(status.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_embedded_for_https_host() {
        assert_eq!(
            authenticated_url("https://github.com/o/r.git", Some("tok")),
            "https://tok@github.com/o/r.git"
        );
    }

    #[test]
    fn test_token_not_embedded_elsewhere() {
        assert_eq!(authenticated_url("http://github.com/o/r", Some("tok")), "http://github.com/o/r");
        assert_eq!(authenticated_url("https://gitlab.com/o/r", Some("tok")), "https://gitlab.com/o/r");
        assert_eq!(authenticated_url("https://github.com/o/r", None), "https://github.com/o/r");
        assert_eq!(authenticated_url("https://github.com/o/r", Some("")), "https://github.com/o/r");
    }

    #[tokio::test]
    async fn test_missing_git_program_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = CloneOptions {
            git_program: "projdl-no-such-git-12345".into(),
            auth_token:  None,
        };
        let result = clone_repository("https://github.com/o/r", &dir.path().join("r"), &options).await;
        assert!(matches!(
            result,
            Err(FetchError::Platform(projdl_platform::Error::CommandNotFound { .. }))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = CloneOptions {
            git_program: "false".into(),
            auth_token:  None,
        };
        let result = clone_repository("https://github.com/o/r", &dir.path().join("r"), &options).await;
        assert!(matches!(result, Err(FetchError::CloneFailed(_))));
    }
}
