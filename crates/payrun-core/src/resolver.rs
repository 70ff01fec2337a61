use tracing::warn;

use crate::store::OutputStore;
use payrun_dsl::{parse_reference, VariableReference};

/// Outcome of resolving one parameter value against the output store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The value contained no variable reference and passes through unchanged
    Literal(String),

    /// The value contained a reference that was found in the store; the
    /// entire parameter value is replaced by the stored output
    Resolved {
        reference: VariableReference,
        value: String,
    },

    /// The value contained a reference with no matching store entry.
    /// The original literal is kept so callers can report it, but the
    /// referencing command must fail - the placeholder text is never sent
    /// to a backend.
    Unresolved {
        reference: VariableReference,
        original: String,
    },
}

impl Resolution {
    /// The string a caller would use: the stored value when resolved,
    /// otherwise the original input.
    pub fn value(&self) -> &str {
        match self {
            Resolution::Literal(value) => value,
            Resolution::Resolved { value, .. } => value,
            Resolution::Unresolved { original, .. } => original,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved { .. })
    }
}

/// Resolve a single parameter value.
///
/// Substitution is all-or-nothing on the whole value: if the string contains
/// a `$command.field` reference, the *entire* string is replaced by the
/// stored output for `"{command}_{field}"`. There is no in-string
/// interpolation. Values without a reference are returned unchanged.
pub fn resolve(value: &str, store: &OutputStore) -> Resolution {
    let Some(reference) = parse_reference(value) else {
        return Resolution::Literal(value.to_string());
    };

    match store.get(&reference.store_key()) {
        Some(stored) => Resolution::Resolved {
            reference,
            value: stored.to_string(),
        },
        None => {
            warn!(
                reference = %reference,
                "Variable reference has no stored output"
            );
            Resolution::Unresolved {
                reference,
                original: value.to_string(),
            }
        }
    }
}
