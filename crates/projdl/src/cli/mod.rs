use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::env::AppEnv;

mod get;
mod list;
mod validate;

#[derive(Clone, Debug, Parser)]
#[command(name = "projdl", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "ls", name = "list", about = "Show the project catalog")]
    List(list::ListArg),
    #[command(alias = "g", name = "get", about = "Fetch one project by its catalog number")]
    Get(get::GetArg),
    #[command(alias = "v", name = "validate", about = "Probe every catalog URL")]
    Validate(validate::ValidateArg),
}

impl App {
    pub async fn run(self) -> Result<ExitCode> {
        let env = AppEnv::load()?;
        match self.cmd {
            Commands::List(arg) => arg.run(&env).await,
            Commands::Get(arg) => arg.run(&env).await,
            Commands::Validate(arg) => arg.run(&env).await,
        }
    }
}
