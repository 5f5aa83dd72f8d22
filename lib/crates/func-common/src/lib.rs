pub mod call;
pub mod config;
pub mod types;

pub use call::{ArgReader, Call, CallArgs};
pub use config::MinionConfig;
pub use types::*;
