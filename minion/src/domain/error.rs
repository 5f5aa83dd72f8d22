//! Typed domain error enums.
//!
//! `ExposureError` is raised while modules and the agent surface are being
//! built, never per call. `ArgumentError` is raised per call and converts
//! into an `invalid_arguments` failure.

use func_common::OperationFailure;
use thiserror::Error;

// ── Exposure errors ───────────────────────────────────────────────────────────

/// Configuration-time faults in a module's declared operation table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExposureError {
    #[error("module '{module}' declares an empty operation name")]
    EmptyName { module: &'static str },

    #[error("module '{module}' declares operation '{operation}' more than once")]
    DuplicateOperation {
        module: &'static str,
        operation: &'static str,
    },

    #[error("operation '{operation}' is exposed by both '{first}' and '{second}'")]
    Collision {
        operation: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

// ── Argument errors ───────────────────────────────────────────────────────────

/// Rejected argument values, detected before any host facility runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("command name '{0}' must not start with '-'")]
    OptionLikeCommand(String),

    #[error("invalid service name '{0}'")]
    InvalidServiceName(String),

    #[error("invalid reboot schedule '{0}': expected 'now', '+<minutes>' or 'HH:MM'")]
    InvalidSchedule(String),

    #[error("reboot message must not start with '-'")]
    OptionLikeMessage,
}

impl From<ArgumentError> for OperationFailure {
    fn from(err: ArgumentError) -> Self {
        OperationFailure::invalid_arguments(err.to_string())
    }
}
