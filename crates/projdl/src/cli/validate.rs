use std::process::ExitCode;

use anyhow::Result;
use projdl_fetch::ProbeResult;
use projdl_pipeline::{Pipeline, Project};
use tabled::Tabled;

use crate::env::AppEnv;
use crate::utils::ui::table::{FormatConfig, Formatter};

#[derive(Clone, Debug, clap::Args)]
pub struct ValidateArg {}

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "#")]
    number: usize,
    name:   String,
    status: &'static str,
    #[tabled(rename = "type")]
    kind:   String,
    code:   String,
    reason: String,
}

impl ValidateArg {
    pub async fn run(&self, env: &AppEnv) -> Result<ExitCode> {
        let client = env.client()?;
        let projects = env.load_catalog(&client).await?;
        let pipeline = Pipeline::new(client, env.config.clone(), env.download_root()).cache(env.validation_cache());

        let results = pipeline.validate(&projects).await;
        let failures = results.iter().filter(|r| !r.ok).count();
        let source = env.config.projects_url.clone().unwrap_or_else(|| env.catalog_file().display().to_string());
        let config = table_config(&source, results.len(), failures);
        println!("{}", Formatter::render(rows(&projects, &results), config));

        Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

fn table_config(source: &str, checked: usize, failures: usize) -> FormatConfig {
    FormatConfig {
        header: Some(format!("URL check for {source}")),
        footer: Some(format!("{checked} checked, {failures} unreachable")),
    }
}

fn rows(projects: &[Project], results: &[ProbeResult]) -> Vec<ProbeRow> {
    projects
        .iter()
        .zip(results)
        .enumerate()
        .map(|(i, (project, result))| ProbeRow {
            number: i + 1,
            name:   project.name.clone(),
            status: if result.ok { "ok" } else { "FAIL" },
            kind:   result.kind.to_string(),
            code:   result.status_code.map(|c| c.to_string()).unwrap_or_default(),
            reason: result.reason.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use projdl_fetch::UrlKind;

    use super::*;

    #[test]
    fn test_rows_pair_projects_with_results() {
        let projects = vec![Project::new("a", "https://a"), Project::new("b", "https://b")];
        let results = vec![
            ProbeResult::reachable(UrlKind::File, Some(200), "Content-Type: application/zip"),
            ProbeResult::failed(Some(404), "HTTP error 404"),
        ];
        let rows = rows(&projects, &results);
        assert_eq!(rows[0].status, "ok");
        assert_eq!(rows[0].kind, "file");
        assert_eq!(rows[1].status, "FAIL");
        assert_eq!(rows[1].code, "404");
    }

    #[test]
    fn test_table_names_catalog_and_counts() {
        let projects = vec![Project::new("a", "https://a")];
        let results = vec![ProbeResult::failed(None, "connection refused")];
        let config = table_config("/home/u/.projdl/projects.json", 1, 1);
        let out = Formatter::render(rows(&projects, &results), config).to_string();
        assert!(out.contains("URL check for /home/u/.projdl/projects.json"));
        assert!(out.contains("1 checked, 1 unreachable"));
        assert!(out.contains("FAIL"));
    }
}
