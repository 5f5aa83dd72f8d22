//! Capability modules exposed by the minion.
//!
//! Each module keeps its business methods callable in-process and declares a
//! separate, explicit table of the operations a remote caller may invoke.

pub mod command;
pub mod reboot;
pub mod service;

pub use command::CommandModule;
pub use reboot::RebootModule;
pub use service::ServiceModule;
