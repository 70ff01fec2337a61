use std::collections::HashSet;

use super::{error_codes, ValidationError};
use crate::command::CommandFile;
use crate::utils::reference::parse_reference;

/// Validate the structure of a command file.
///
/// Checks performed:
/// - command names are non-empty and unique
/// - user credentials carry a non-empty id and password
/// - every `$command.field` parameter reference points at a command that
///   appears *earlier* in the list (a forward or self reference can never
///   resolve at runtime; a reference to a name not in the file at all is a
///   separate error)
pub fn validate(file: &CommandFile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_names = HashSet::new();
    for (index, command) in file.commands.iter().enumerate() {
        let path = format!("commands[{}]", index);

        if command.name.trim().is_empty() {
            errors.push(ValidationError {
                code: error_codes::INVALID_NAME,
                message: "Command name must not be empty".to_string(),
                path: Some(path.clone()),
            });
        } else if !seen_names.insert(command.name.clone()) {
            errors.push(ValidationError {
                code: error_codes::DUPLICATE_NAME,
                message: format!("Duplicate command name: {}", command.name),
                path: Some(path.clone()),
            });
        }

        if command.user.id.trim().is_empty() {
            errors.push(ValidationError {
                code: error_codes::MISSING_REQUIRED_FIELD,
                message: "User id must not be empty".to_string(),
                path: Some(format!("{}.user.id", path)),
            });
        }
        if command.user.password.is_empty() {
            errors.push(ValidationError {
                code: error_codes::MISSING_REQUIRED_FIELD,
                message: "User password must not be empty".to_string(),
                path: Some(format!("{}.user.password", path)),
            });
        }
    }

    // Reference checks against execution order: a command may only reference
    // commands that appear strictly before it.
    let all_names: HashSet<&str> = file.commands.iter().map(|c| c.name.as_str()).collect();
    let mut earlier_names: HashSet<&str> = HashSet::new();

    for (index, command) in file.commands.iter().enumerate() {
        for (param_name, param_value) in &command.parameters {
            let Some(value) = param_value.as_str() else {
                continue;
            };
            let Some(reference) = parse_reference(value) else {
                continue;
            };
            let path = format!("commands[{}].parameters.{}", index, param_name);

            if !all_names.contains(reference.command.as_str()) {
                errors.push(ValidationError {
                    code: error_codes::UNKNOWN_REFERENCE,
                    message: format!(
                        "Reference {} names a command not present in this file",
                        reference
                    ),
                    path: Some(path),
                });
            } else if !earlier_names.contains(reference.command.as_str()) {
                errors.push(ValidationError {
                    code: error_codes::FORWARD_REFERENCE,
                    message: format!(
                        "Reference {} points at a command that has not run yet",
                        reference
                    ),
                    path: Some(path),
                });
            }
        }
        earlier_names.insert(command.name.as_str());
    }

    errors
}
