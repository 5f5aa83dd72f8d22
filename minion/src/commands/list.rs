//! List command: prints the agent's exposed operations.

use anyhow::{Context, Result};
use clap::Args;

use crate::application::AgentSurface;

#[derive(Args)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Print every `(operation, module)` pair, sorted by operation.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(agent: &AgentSurface, args: &ListArgs) -> Result<()> {
    let operations = agent.operations();
    if args.json {
        let entries: Vec<_> = operations
            .iter()
            .map(|(operation, module)| {
                serde_json::json!({ "operation": operation, "module": module })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("JSON serialization failed")?
        );
    } else {
        for (operation, module) in operations {
            println!("{operation:<16} {module}");
        }
    }
    Ok(())
}
