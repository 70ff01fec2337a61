use crate::command::{CommandFile, SetupFile};
use crate::error::DslError;
use std::error::Error;
use std::fmt;

mod command_validator;
mod setup_validator;

/// Represents a validation error found in a command or setup file
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the location of the error (e.g., "commands[2].parameters.amount")
    pub path: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// A parameter references a command that runs later (or itself)
    pub const FORWARD_REFERENCE: &str = "ERR_DSL_VALIDATION_FORWARD_REFERENCE";

    /// A parameter references a command name that does not exist in the file
    pub const UNKNOWN_REFERENCE: &str = "ERR_DSL_VALIDATION_UNKNOWN_REFERENCE";

    /// Duplicate command name found
    pub const DUPLICATE_NAME: &str = "ERR_DSL_VALIDATION_DUPLICATE_NAME";

    /// Empty or invalid command name
    pub const INVALID_NAME: &str = "ERR_DSL_VALIDATION_INVALID_NAME";

    /// Missing required field
    pub const MISSING_REQUIRED_FIELD: &str = "ERR_DSL_VALIDATION_MISSING_REQUIRED_FIELD";

    /// Invalid setup item (unknown owner, empty section values, etc.)
    pub const INVALID_SETUP_ITEM: &str = "ERR_DSL_VALIDATION_INVALID_SETUP_ITEM";
}

/// Validate a parsed command file
pub fn validate_command_file(file: &CommandFile) -> Result<(), DslError> {
    let errors = command_validator::validate(file);
    if !errors.is_empty() {
        return Err(DslError::from_validation_errors(errors));
    }
    Ok(())
}

/// Validate a parsed setup file
pub fn validate_setup_file(file: &SetupFile) -> Result<(), DslError> {
    let errors = setup_validator::validate(file);
    if !errors.is_empty() {
        return Err(DslError::from_validation_errors(errors));
    }
    Ok(())
}
