//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution and
//! filesystem probing.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::cli` are forbidden.

pub mod command_runner;
pub mod descriptor;

pub use command_runner::TokioProcessRunner;
pub use descriptor::InitDirProbe;
