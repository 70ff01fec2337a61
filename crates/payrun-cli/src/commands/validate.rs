use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use payrun_dsl::{parse_and_validate_command_file, DslError};

/// Parse and validate the command file without contacting any service.
pub async fn validate(file: &Path) -> Result<bool> {
    let yaml = fs::read_to_string(file)
        .with_context(|| format!("Failed to read command file {}", file.display()))?;

    match parse_and_validate_command_file(&yaml) {
        Ok(command_file) => {
            println!(
                "{}: {} commands, no problems found",
                file.display(),
                command_file.commands.len()
            );
            Ok(true)
        }
        Err(DslError::MultipleValidationErrors(errors)) => {
            println!("{}: {} validation errors", file.display(), errors.len());
            for error in &errors {
                match &error.path {
                    Some(path) => println!("  [{}] {} (at {})", error.code, error.message, path),
                    None => println!("  [{}] {}", error.code, error.message),
                }
            }
            Ok(false)
        }
        Err(err) => {
            println!("{}: {}", file.display(), err);
            Ok(false)
        }
    }
}
