//! Project lifecycle hooks.
//!
//! Hooks are shell command strings carried by the project. The runner is a
//! trait so the pipeline can be driven without a real shell.

use std::sync::Arc;

use projdl_platform::command::Command;
use projdl_platform::shell::Shell;

use crate::data::{HookStage, Project};
use crate::error::HookError;

/// Executes one hook command for a stage.
pub trait HookRunner: Send + Sync {
    fn run(&self, stage: HookStage, command: &str) -> Result<(), HookError>;
}

/// Runs hooks through the host shell (`sh -c` / `cmd /C`).
#[derive(Debug, Clone, Copy)]
pub struct ShellHookRunner {
    shell: Shell,
}

impl Default for ShellHookRunner {
    fn default() -> Self { Self { shell: Shell::host() } }
}

impl HookRunner for ShellHookRunner {
    fn run(&self, stage: HookStage, command: &str) -> Result<(), HookError> {
        let status = Command::shell(self.shell, command)
            .status()
            .map_err(|source| HookError::Spawn { stage, source })?;
        if status.success() {
            Ok(())
        } else {
            Err(HookError::Exit {
                stage,
                status: status.to_string(),
            })
        }
    }
}

/// Run the project's hook for `stage` on the blocking pool.
///
/// An absent hook succeeds.
pub async fn run_hook(runner: &Arc<dyn HookRunner>, project: &Project, stage: HookStage) -> Result<(), HookError> {
    let Some(command) = project.hook(stage) else {
        return Ok(());
    };
    tracing::info!(project = %project.name, %stage, command, "running hook");

    let runner = Arc::clone(runner);
    let command = command.to_string();
    let result = tokio::task::spawn_blocking(move || runner.run(stage, &command))
        .await
        .map_err(|e| HookError::Aborted {
            stage,
            reason: e.to_string(),
        })
        .and_then(|r| r);

    if let Err(e) = &result {
        tracing::warn!(project = %project.name, error = %e, "hook failed");
    }
    result
}
