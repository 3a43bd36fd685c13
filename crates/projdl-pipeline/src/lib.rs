//! Download pipeline for catalog projects.
//!
//! # Architecture
//!
//! - `data.rs` - Project, configuration and outcome records
//! - `layout.rs` - Target paths under the download root
//! - `hooks.rs` - Pre/post shell hooks
//! - `cache.rs` - Persistent probe cache
//! - `notify.rs` - Webhook notifications
//! - `audit.rs` - Download log sink
//! - `pipeline.rs` - The orchestrator

pub mod audit;
pub mod cache;
pub mod data;
mod error;
pub mod hooks;
pub mod layout;
pub mod notify;
mod pipeline;

pub use audit::{AuditSink, JsonlAuditSink};
pub use cache::{CacheEntry, ValidationCache};
pub use data::{AuditRecord, Branch, Config, HookStage, PipelineResult, Plan, Project, Report};
pub use error::{AuditError, CacheError, HookError, PipelineError, Result};
pub use hooks::{HookRunner, ShellHookRunner};
pub use pipeline::Pipeline;
