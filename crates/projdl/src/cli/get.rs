use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use projdl_pipeline::{AuditRecord, AuditSink, Branch, JsonlAuditSink, Pipeline, Plan, Project, Report};

use crate::env::AppEnv;
use crate::utils::ui::tracker::{ProgressTracker, ProgressTrackerConfig, Tracker};

#[derive(Clone, Debug, clap::Args)]
pub struct GetArg {
    /// Catalog number as shown by `list`.
    pub index:   usize,
    /// Download into this directory instead of the configured one.
    #[arg(long)]
    pub path:    Option<PathBuf>,
    /// Classify and print the target without downloading.
    #[arg(long)]
    pub dry_run: bool,
}

impl GetArg {
    pub async fn run(&self, env: &AppEnv) -> Result<ExitCode> {
        let client = env.client()?;
        let projects = env.load_catalog(&client).await?;
        let project = select(&projects, self.index)?;

        let root = self.path.clone().unwrap_or_else(|| env.download_root());
        let pipeline = Pipeline::new(client, env.config.clone(), root).cache(env.validation_cache());

        if self.dry_run {
            let plan = pipeline.plan(project).await;
            print_plan(project, &plan);
            return Ok(if plan.branch.is_some() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }

        let tracker = ProgressTracker::new(ProgressTrackerConfig::default());
        let bar = tracker.clone();
        let pipeline = pipeline.on_progress(move |progress| bar.update(progress));
        let report = pipeline.run(project).await;
        tracker.finish(None);

        let sink = JsonlAuditSink::new(env.paths.audit_log());
        if let Err(e) = sink.record(&AuditRecord::from_report(project, &report)) {
            tracing::warn!(path = %sink.path().display(), error = %e, "failed to write download log");
        }

        print_report(project, &report);
        Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

fn select(projects: &[Project], index: usize) -> Result<&Project> {
    match index.checked_sub(1).and_then(|i| projects.get(i)) {
        Some(project) => Ok(project),
        None if projects.is_empty() => bail!("the catalog is empty"),
        None => bail!("no project #{index}; pick 1 to {}", projects.len()),
    }
}

fn print_plan(project: &Project, plan: &Plan) {
    println!("{}: {} ({})", project.name, plan.probe.kind, plan.probe.reason);
    match (&plan.branch, &plan.target) {
        (Some(branch), Some(target)) => {
            let verb = match branch {
                Branch::Clone => "clone",
                Branch::Download => "download",
            };
            println!("  would {verb} into {}", target.display());
        }
        _ => println!("  nothing would be fetched"),
    }
}

fn print_report(project: &Project, report: &Report) {
    println!("{}: {}", project.name, report.result);
    if let Some(path) = &report.path {
        println!("  path: {}", path.display());
    }
    if let Some(reason) = &report.reason {
        println!("  reason: {reason}");
    }
    if !report.post_hook_ok {
        println!("  post-hook failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_one_based() {
        let projects = vec![Project::new("a", "https://a"), Project::new("b", "https://b")];
        assert_eq!(select(&projects, 1).unwrap().name, "a");
        assert_eq!(select(&projects, 2).unwrap().name, "b");
        assert!(select(&projects, 0).is_err());
        assert!(select(&projects, 3).is_err());
        assert!(select(&[], 1).unwrap_err().to_string().contains("empty"));
    }
}
