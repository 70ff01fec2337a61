use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // First occurrence of a `$command.field` reference anywhere in a value.
    // Both atoms are identifiers: [A-Za-z_][A-Za-z0-9_]*
    static ref VARIABLE_REF_REGEX: Regex = Regex::new(
        r"\$([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)"
    ).unwrap();
}

/// A variable reference extracted from a parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// Name of the command whose output is referenced
    pub command: String,
    /// Name of the stored output field
    pub field: String,
}

impl VariableReference {
    /// The composite key this reference resolves against: "{command}_{field}"
    pub fn store_key(&self) -> String {
        format!("{}_{}", self.command, self.field)
    }
}

impl std::fmt::Display for VariableReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{}", self.command, self.field)
    }
}

/// Check whether a parameter value contains a variable reference
pub fn contains_reference(value: &str) -> bool {
    VARIABLE_REF_REGEX.is_match(value)
}

/// Extract the first variable reference from a parameter value.
///
/// Only the first match matters: resolution replaces the entire parameter
/// value with the stored output, never interpolates into the string.
pub fn parse_reference(value: &str) -> Option<VariableReference> {
    VARIABLE_REF_REGEX.captures(value).map(|captures| VariableReference {
        command: captures[1].to_string(),
        field: captures[2].to_string(),
    })
}
