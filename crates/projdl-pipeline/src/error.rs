use thiserror::Error;

use crate::data::HookStage;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("{stage}-hook could not be started: {source}")]
    Spawn {
        stage:  HookStage,
        #[source]
        source: projdl_platform::Error,
    },

    #[error("{stage}-hook exited with {status}")]
    Exit { stage: HookStage, status: String },

    #[error("{stage}-hook task was aborted: {reason}")]
    Aborted { stage: HookStage, reason: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Fs(#[from] projdl_fs::Error),

    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to append audit record to {path}: {source}")]
    Io {
        path:   std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audit serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single pipeline stage. Never escapes [`crate::Pipeline::run`];
/// it is folded into the report's reason.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] projdl_fetch::FetchError),

    #[error(transparent)]
    Verify(#[from] projdl_verify::VerifyError),

    #[error(transparent)]
    Archive(#[from] projdl_archive::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
