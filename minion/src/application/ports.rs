//! Port trait definitions for the host facilities capability modules use.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `func_common` and never from `crate::infra`.

use std::future::Future;
use std::sync::Arc;

use func_common::{ExecutionResult, OperationFailure};

// ── Process Execution Port ────────────────────────────────────────────────────

/// Spawns an external program and waits for it.
///
/// `args` are discrete argv tokens; implementations must never hand them to a
/// shell. The returned future is `Send` so each call can run on its own
/// worker task.
pub trait ProcessRunner: Send + Sync + 'static {
    /// Run `program` to completion and capture its output.
    ///
    /// A non-zero exit is a normal `Ok` result. `Err` is reserved for calls
    /// where no exit status exists: spawn failure, wait failure, or timeout.
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = Result<ExecutionResult, OperationFailure>> + Send;
}

impl<T: ProcessRunner> ProcessRunner for Arc<T> {
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = Result<ExecutionResult, OperationFailure>> + Send {
        (**self).run(program, args)
    }
}

// ── Service Descriptor Port ───────────────────────────────────────────────────

/// Answers whether a service's init descriptor is installed on the host.
pub trait DescriptorProbe: Send + Sync + 'static {
    /// `service_name` has already been validated as a single path component.
    fn descriptor_exists(&self, service_name: &str) -> bool;
}

impl<T: DescriptorProbe> DescriptorProbe for Arc<T> {
    fn descriptor_exists(&self, service_name: &str) -> bool {
        (**self).descriptor_exists(service_name)
    }
}
