use crate::command::{CommandFile, SetupFile};
use crate::error::DslError;

/// The only command file format version this crate understands
pub const SUPPORTED_VERSION: &str = "1.0";

/// Parse a YAML string into a CommandFile.
///
/// This handles the initial conversion from YAML text to structured data and
/// the version gate. It does not perform structural validation of names and
/// references - that's handled separately by the validation module.
pub fn parse_command_file(yaml_str: &str) -> Result<CommandFile, DslError> {
    let file: CommandFile = serde_yaml::from_str(yaml_str)?;

    if file.version != SUPPORTED_VERSION {
        return Err(DslError::UnsupportedVersion(file.version));
    }

    Ok(file)
}

/// Parse a YAML string into a SetupFile, applying the same version gate.
pub fn parse_setup_file(yaml_str: &str) -> Result<SetupFile, DslError> {
    let file: SetupFile = serde_yaml::from_str(yaml_str)?;

    if file.version != SUPPORTED_VERSION {
        return Err(DslError::UnsupportedVersion(file.version));
    }

    Ok(file)
}
