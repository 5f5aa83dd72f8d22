//! Application layer: host-facility ports, the exposure base, capability
//! modules and the composed agent surface.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::cli`.

pub mod agent;
pub mod exposure;
pub mod modules;
pub mod ports;

pub use agent::AgentSurface;
pub use exposure::{CapabilityModule, ExposureTable, HandlerFuture, Module, RpcSurface};
pub use ports::{DescriptorProbe, ProcessRunner};
