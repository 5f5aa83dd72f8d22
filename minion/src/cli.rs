//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use func_common::MinionConfig;

use crate::commands;

/// func minion - exposes whitelisted host capabilities to a remote overlord
#[derive(Parser)]
#[command(
    name = "funcd",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List exposed operations and the module that owns each
    List(commands::list::ListArgs),

    /// Dispatch a single call and print its result as JSON
    Call(commands::call::CallOpts),

    /// Dispatch newline-delimited JSON calls from stdin, one worker per call
    Serve,

    /// Show version
    Version {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, the agent surface
    /// cannot be composed, or stdio fails while serving.
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Version { json } => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
            Command::List(args) => {
                let agent = build_agent()?;
                commands::list::run(&agent, &args)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Call(opts) => {
                let agent = build_agent()?;
                commands::call::run(&agent, opts).await
            }
            Command::Serve => {
                let agent = build_agent()?;
                commands::serve::run(agent).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_agent() -> Result<crate::application::AgentSurface> {
    let config: MinionConfig = envy::prefixed("FUNC_MINION_")
        .from_env()
        .context("failed to load config from FUNC_MINION_* env vars")?;
    tracing::debug!(?config, "configuration loaded");
    crate::app::build_agent(&config).context("failed to compose the agent surface")
}
