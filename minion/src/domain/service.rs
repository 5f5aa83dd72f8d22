//! Service control verbs and service-name validation.

use super::error::ArgumentError;

/// Control verbs accepted by the host service facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
    Status,
}

impl ServiceAction {
    /// The verb passed to the service-control facility.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Reload => "reload",
            ServiceAction::Status => "status",
        }
    }
}

/// Reject names that could escape the init directory or read as an option.
pub fn validate_service_name(name: &str) -> Result<(), ArgumentError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.starts_with('-')
        || name.contains(['/', '\\', '\0'])
        || name.chars().any(char::is_whitespace);
    if invalid {
        return Err(ArgumentError::InvalidServiceName(name.to_string()));
    }
    Ok(())
}
