use std::time::Duration;

use serde::Deserialize;

/// Minion configuration, loaded from `FUNC_MINION_*` environment variables.
///
/// Host-facility program paths are configurable so test hosts and
/// distributions with a different layout can point at their own binaries.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MinionConfig {
    /// Directories searched for service init descriptors (comma separated).
    #[serde(default = "default_init_dirs")]
    pub init_dirs: Vec<String>,

    /// Service-control facility, invoked as `<service_bin> <name> <verb>`.
    #[serde(default = "default_service_bin")]
    pub service_bin: String,

    /// Reboot facility, invoked as `<shutdown_bin> -r <when> <message>`.
    #[serde(default = "default_shutdown_bin")]
    pub shutdown_bin: String,

    /// Path-resolution facility, invoked as `<which_bin> <command>`.
    #[serde(default = "default_which_bin")]
    pub which_bin: String,

    /// Kill host facilities after this many seconds. Unset means unbounded.
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,
}

fn default_init_dirs() -> Vec<String> {
    vec!["/etc/rc.d/init.d".to_string()]
}

fn default_service_bin() -> String {
    "/sbin/service".to_string()
}

fn default_shutdown_bin() -> String {
    "/sbin/shutdown".to_string()
}

fn default_which_bin() -> String {
    "/usr/bin/which".to_string()
}

impl MinionConfig {
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for MinionConfig {
    fn default() -> Self {
        Self {
            init_dirs: default_init_dirs(),
            service_bin: default_service_bin(),
            shutdown_bin: default_shutdown_bin(),
            which_bin: default_which_bin(),
            command_timeout_secs: None,
        }
    }
}
