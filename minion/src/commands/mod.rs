//! Command handlers for the `funcd` binary.

pub mod call;
pub mod list;
pub mod serve;
pub mod version;
