use std::process::ExitCode;

use anyhow::Result;
use projdl_pipeline::Project;
use tabled::Tabled;

use crate::env::AppEnv;
use crate::utils::ui::table::{FormatConfig, Formatter};

#[derive(Clone, Debug, clap::Args)]
pub struct ListArg {
    /// Only show projects carrying this tag.
    #[arg(long, short)]
    pub tag: Option<String>,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "#")]
    number: usize,
    name:   String,
    url:    String,
    sha256: &'static str,
    tags:   String,
}

impl ListArg {
    pub async fn run(&self, env: &AppEnv) -> Result<ExitCode> {
        let client = env.client()?;
        let projects = env.load_catalog(&client).await?;
        let rows = rows(&projects, self.tag.as_deref());

        if rows.is_empty() {
            println!("No projects in catalog.");
            return Ok(ExitCode::SUCCESS);
        }
        let config = FormatConfig {
            footer: Some(format!("{} of {} projects", rows.len(), projects.len())),
            ..FormatConfig::default()
        };
        println!("{}", Formatter::render(rows, config));
        Ok(ExitCode::SUCCESS)
    }
}

/// Numbered from 1, matching `get`; a filtered row keeps its catalog number.
fn rows(projects: &[Project], tag: Option<&str>) -> Vec<ProjectRow> {
    projects
        .iter()
        .enumerate()
        .filter(|(_, p)| tag.is_none_or(|t| p.tags.contains(t)))
        .map(|(i, p)| ProjectRow {
            number: i + 1,
            name:   p.name.clone(),
            url:    p.url.clone(),
            sha256: if p.expected_sha256().is_some() { "yes" } else { "" },
            tags:   p.tags.iter().cloned().collect::<Vec<_>>().join(","),
        })
        .collect()
}
