//! Domain layer: pure parsing and validation for capability arguments.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod error;
pub mod reboot;
pub mod service;

pub use command::{split_command, validate_lookup_name};
pub use error::{ArgumentError, ExposureError};
pub use reboot::{validate_message, validate_schedule};
pub use service::{ServiceAction, validate_service_name};
