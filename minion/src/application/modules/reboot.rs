//! Host reboot.
//!
//! Fire-and-forget: a successful return only means the reboot facility
//! accepted the request. The host may become unreachable at any point after.

use std::sync::Arc;

use func_common::{CallArgs, OperationFailure};

use crate::application::exposure::{CapabilityModule, ExposureTable};
use crate::application::ports::ProcessRunner;
use crate::domain::{validate_message, validate_schedule};

/// Schedule used when the caller does not pass one.
pub const DEFAULT_WHEN: &str = "now";

pub struct RebootModule<R> {
    runner: R,
    shutdown_bin: String,
}

impl<R: ProcessRunner> RebootModule<R> {
    pub fn new(runner: R, shutdown_bin: impl Into<String>) -> Self {
        Self {
            runner,
            shutdown_bin: shutdown_bin.into(),
        }
    }

    /// Ask the reboot facility to restart the host and return its exit code unchanged.
    pub async fn reboot(&self, when: &str, message: &str) -> Result<i32, OperationFailure> {
        validate_schedule(when)?;
        validate_message(message)?;

        tracing::warn!(when, message, "reboot requested");
        let args = ["-r".to_string(), when.to_string(), message.to_string()];
        let result = self.runner.run(&self.shutdown_bin, &args).await?;
        Ok(result.exit_code)
    }

    async fn rpc_reboot(self: Arc<Self>, args: CallArgs) -> Result<i32, OperationFailure> {
        let mut reader = args.reader();
        let when = reader.string_or("when", DEFAULT_WHEN)?;
        let message = reader.string_or("message", "")?;
        reader.finish()?;
        self.reboot(&when, &message).await
    }
}

impl<R: ProcessRunner> CapabilityModule for RebootModule<R> {
    const NAME: &'static str = "reboot";

    fn declare(table: &mut ExposureTable<Self>) {
        table.expose("reboot", Self::rpc_reboot);
    }
}
