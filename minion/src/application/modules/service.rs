//! Init-script service control.
//!
//! Exposes `service_start`, `service_stop`, `service_restart`,
//! `service_reload` and `service_status`. Every action first checks that the
//! service's init descriptor is installed and refuses to touch the control
//! facility otherwise.

use std::sync::Arc;

use func_common::{CallArgs, OperationFailure};

use crate::application::exposure::{CapabilityModule, ExposureTable};
use crate::application::ports::{DescriptorProbe, ProcessRunner};
use crate::domain::{ServiceAction, validate_service_name};

pub struct ServiceModule<R, D> {
    runner: R,
    probe: D,
    service_bin: String,
}

impl<R: ProcessRunner, D: DescriptorProbe> ServiceModule<R, D> {
    pub fn new(runner: R, probe: D, service_bin: impl Into<String>) -> Self {
        Self {
            runner,
            probe,
            service_bin: service_bin.into(),
        }
    }

    /// Issue `action` against `service_name` and return the facility's exit code.
    ///
    /// # Errors
    ///
    /// - `invalid_arguments` if the name is not a single plain path component.
    /// - `precondition_failed` if no init descriptor exists for the service;
    ///   the control facility is not invoked.
    /// - `invocation_error` / `timeout` from the control facility itself.
    pub async fn control(
        &self,
        service_name: &str,
        action: ServiceAction,
    ) -> Result<i32, OperationFailure> {
        validate_service_name(service_name)?;
        if !self.probe.descriptor_exists(service_name) {
            tracing::warn!(service = service_name, verb = action.verb(), "service not installed");
            return Err(OperationFailure::precondition_failed(format!(
                "service not installed: {service_name}"
            )));
        }

        let args = [service_name.to_string(), action.verb().to_string()];
        let result = self.runner.run(&self.service_bin, &args).await?;
        tracing::info!(
            service = service_name,
            verb = action.verb(),
            exit_code = result.exit_code,
            "service control finished"
        );
        Ok(result.exit_code)
    }

    pub async fn start(&self, service_name: &str) -> Result<i32, OperationFailure> {
        self.control(service_name, ServiceAction::Start).await
    }

    pub async fn stop(&self, service_name: &str) -> Result<i32, OperationFailure> {
        self.control(service_name, ServiceAction::Stop).await
    }

    pub async fn restart(&self, service_name: &str) -> Result<i32, OperationFailure> {
        self.control(service_name, ServiceAction::Restart).await
    }

    pub async fn reload(&self, service_name: &str) -> Result<i32, OperationFailure> {
        self.control(service_name, ServiceAction::Reload).await
    }

    pub async fn status(&self, service_name: &str) -> Result<i32, OperationFailure> {
        self.control(service_name, ServiceAction::Status).await
    }

    async fn rpc_control(
        self: Arc<Self>,
        args: CallArgs,
        action: ServiceAction,
    ) -> Result<i32, OperationFailure> {
        let mut reader = args.reader();
        let service_name = reader.string("service_name")?;
        reader.finish()?;
        self.control(&service_name, action).await
    }
}

impl<R: ProcessRunner, D: DescriptorProbe> CapabilityModule for ServiceModule<R, D> {
    const NAME: &'static str = "service";

    fn declare(table: &mut ExposureTable<Self>) {
        table
            .expose("service_start", |m, args| m.rpc_control(args, ServiceAction::Start))
            .expose("service_stop", |m, args| m.rpc_control(args, ServiceAction::Stop))
            .expose("service_restart", |m, args| m.rpc_control(args, ServiceAction::Restart))
            .expose("service_reload", |m, args| m.rpc_control(args, ServiceAction::Reload))
            .expose("service_status", |m, args| m.rpc_control(args, ServiceAction::Status));
    }
}
