//! Call command: dispatches one operation locally and prints the outcome.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use func_common::{Call, CallArgs, OperationFailure};
use serde_json::{Map, Value, json};

use crate::application::AgentSurface;

#[derive(Args)]
pub struct CallOpts {
    /// Operation name, e.g. `run` or `service_status`
    pub operation: String,

    /// Positional arguments, passed as strings
    pub args: Vec<String>,

    /// Keyword argument (repeatable)
    #[arg(long = "kwarg", value_name = "KEY=VALUE", value_parser = parse_kwarg)]
    pub kwargs: Vec<(String, String)>,

    /// Parse every argument value as JSON instead of a plain string
    #[arg(long)]
    pub json_args: bool,
}

fn parse_kwarg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

impl CallOpts {
    fn into_call(self) -> Result<Call> {
        let json_args = self.json_args;
        let decode = |raw: String| -> Result<Value> {
            if json_args {
                serde_json::from_str(&raw).with_context(|| format!("argument is not valid JSON: {raw}"))
            } else {
                Ok(Value::String(raw))
            }
        };

        let args = self
            .args
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>>>()?;
        let mut kwargs = Map::new();
        for (key, raw) in self.kwargs {
            kwargs.insert(key, decode(raw)?);
        }
        Ok(Call::new(self.operation, CallArgs { args, kwargs }))
    }
}

/// Wrap an outcome the way the caller sees it: `{"ok": ...}` or `{"error": {...}}`.
#[must_use]
pub fn envelope(outcome: &Result<Value, OperationFailure>) -> Value {
    match outcome {
        Ok(value) => json!({ "ok": value }),
        Err(failure) => json!({ "error": failure }),
    }
}

/// Dispatch the call and print its envelope. A failed call exits with 1.
///
/// # Errors
///
/// Returns an error if an argument cannot be decoded.
pub async fn run(agent: &AgentSurface, opts: CallOpts) -> Result<ExitCode> {
    let call = opts.into_call()?;
    let outcome = agent.dispatch(call).await;
    println!("{}", envelope(&outcome));
    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
