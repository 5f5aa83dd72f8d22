//! Argument vector construction for the command capability.

use super::error::ArgumentError;

/// Split a command line into an argument vector on whitespace.
///
/// No quoting, escaping, globbing or variable expansion: `"a b"` yields two
/// tokens `"a` and `b"`. Shell metacharacters are passed through as literal
/// arguments because no shell ever sees them.
pub fn split_command(command: &str) -> Result<Vec<String>, ArgumentError> {
    let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return Err(ArgumentError::EmptyCommand);
    }
    Ok(argv)
}

/// Check a name handed to the path resolver. A leading `-` would be read as
/// one of the resolver's own options.
pub fn validate_lookup_name(name: &str) -> Result<(), ArgumentError> {
    if name.starts_with('-') {
        return Err(ArgumentError::OptionLikeCommand(name.to_string()));
    }
    Ok(())
}
