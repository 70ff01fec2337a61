//! # Payrun DSL
//!
//! YAML file formats for the payrun orchestrator. This crate parses and
//! validates the two input file kinds:
//!
//! * **Command files** - an ordered `commands:` list executed strictly in
//!   order, where string parameters may reference the stored outputs of
//!   earlier commands via `$command.field`.
//! * **Setup files** - per-entity sections (`users:`, `groups:`, `tokens:`,
//!   `assets:`, `bank_accounts:`) used by the provisioning pipeline.
//!
//! ## Example
//!
//! ```
//! use payrun_dsl::parse_and_validate_command_file;
//!
//! let yaml = r#"
//! version: "1.0"
//! commands:
//!   - name: dep1
//!     type: deposit
//!     user:
//!       id: alice@example.com
//!       password: secret
//!     parameters:
//!       amount: "100"
//!       asset: USD
//!   - name: tr1
//!     type: transfer
//!     user:
//!       id: alice@example.com
//!       password: secret
//!     parameters:
//!       amount: "$dep1.amount"
//!       to: bob@example.com
//! "#;
//!
//! let result = parse_and_validate_command_file(yaml);
//! assert!(result.is_ok());
//! ```

mod error;
mod parser;

pub mod command;
pub mod utils;
pub mod validation;

pub use command::{
    AssetDefinition, BankAccountDefinition, CommandDefinition, CommandFile, CommandKind,
    GroupDefinition, SetupFile, TokenDefinition, UserCredentials, UserDefinition,
};
pub use error::DslError;
pub use parser::{parse_command_file, parse_setup_file, SUPPORTED_VERSION};
pub use utils::reference::{contains_reference, parse_reference, VariableReference};
pub use validation::ValidationError;

/// Parse and validate a command file.
///
/// 1. Parses the YAML into structured data and gates on the file version
/// 2. Validates names, credentials, and reference ordering
/// 3. Returns a fully validated `CommandFile` or a detailed error
pub fn parse_and_validate_command_file(yaml_str: &str) -> Result<CommandFile, DslError> {
    let file = parser::parse_command_file(yaml_str)?;
    validation::validate_command_file(&file)?;
    Ok(file)
}

/// Parse and validate a setup file.
pub fn parse_and_validate_setup_file(yaml_str: &str) -> Result<SetupFile, DslError> {
    let file = parser::parse_setup_file(yaml_str)?;
    validation::validate_setup_file(&file)?;
    Ok(file)
}
