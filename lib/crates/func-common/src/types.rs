use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable tag carried by every failed call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The requested name is not in the surface being called.
    UnknownOperation,
    /// Missing, surplus, or mistyped arguments.
    InvalidArguments,
    /// A check that guards the host action did not hold (e.g. service not installed).
    PreconditionFailed,
    /// The host facility could not be spawned or the handler faulted.
    InvocationError,
    /// The host facility outlived its configured deadline and was killed.
    Timeout,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::UnknownOperation => "unknown_operation",
            FailureKind::InvalidArguments => "invalid_arguments",
            FailureKind::PreconditionFailed => "precondition_failed",
            FailureKind::InvocationError => "invocation_error",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure returned to the caller in place of an internal fault.
///
/// A non-zero exit status from a host facility is NOT a failure: it is
/// returned as the operation's normal result so the caller sees the raw code.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct OperationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl OperationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_operation(operation: &str) -> Self {
        Self::new(
            FailureKind::UnknownOperation,
            format!("unknown operation: {operation}"),
        )
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArguments, message)
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::PreconditionFailed, message)
    }

    pub fn invocation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvocationError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }
}

/// Outcome of a child process that ran to completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code, or the negated signal number if the child was killed.
    pub exit_code: i32,
    /// Raw captured stdout. Never decoded or split.
    pub stdout: Vec<u8>,
    /// Raw captured stderr. Never decoded or split.
    pub stderr: Vec<u8>,
}

impl ExecutionResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
