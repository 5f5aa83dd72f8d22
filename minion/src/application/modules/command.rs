//! Arbitrary command execution.
//!
//! Exposes `run` and `exists`. Not for interactive commands: the child gets
//! no stdin and no terminal, and its output is captured, never displayed.

use std::sync::Arc;

use func_common::{CallArgs, ExecutionResult, OperationFailure};

use crate::application::exposure::{CapabilityModule, ExposureTable};
use crate::application::ports::ProcessRunner;
use crate::domain::{split_command, validate_lookup_name};

pub struct CommandModule<R> {
    runner: R,
    which_bin: String,
}

impl<R: ProcessRunner> CommandModule<R> {
    pub fn new(runner: R, which_bin: impl Into<String>) -> Self {
        Self {
            runner,
            which_bin: which_bin.into(),
        }
    }

    /// Run `command` and return its exit code with raw stdout and stderr.
    ///
    /// The line is split on whitespace into an argument vector; no shell is
    /// involved. Blocks the calling task until the child exits.
    pub async fn run(&self, command: &str) -> Result<ExecutionResult, OperationFailure> {
        let argv = split_command(command)?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| OperationFailure::invalid_arguments("command is empty"))?;
        self.runner.run(program, args).await
    }

    /// Whether `command` resolves on the host's search path.
    ///
    /// Only asks the path resolver; `command` itself is never executed.
    pub async fn exists(&self, command: &str) -> Result<bool, OperationFailure> {
        validate_lookup_name(command)?;
        let resolved = self
            .runner
            .run(&self.which_bin, &[command.to_string()])
            .await?;
        Ok(resolved.success())
    }

    async fn rpc_run(self: Arc<Self>, args: CallArgs) -> Result<ExecutionResult, OperationFailure> {
        let mut reader = args.reader();
        let command = reader.string("command")?;
        reader.finish()?;
        self.run(&command).await
    }

    async fn rpc_exists(self: Arc<Self>, args: CallArgs) -> Result<bool, OperationFailure> {
        let mut reader = args.reader();
        let command = reader.string("command")?;
        reader.finish()?;
        self.exists(&command).await
    }
}

impl<R: ProcessRunner> CapabilityModule for CommandModule<R> {
    const NAME: &'static str = "command";

    fn declare(table: &mut ExposureTable<Self>) {
        table
            .expose("run", Self::rpc_run)
            .expose("exists", Self::rpc_exists);
    }
}
