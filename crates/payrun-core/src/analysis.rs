use crate::descriptor::descriptor_for;
use payrun_dsl::{parse_reference, CommandFile, VariableReference};

/// Static analysis of one variable reference in a command file
#[derive(Debug, Clone)]
pub struct ReferenceAnalysis {
    /// Command whose parameter carries the reference
    pub command: String,

    /// Parameter name
    pub parameter: String,

    /// The reference itself
    pub reference: VariableReference,

    /// Whether the referenced command appears earlier in the file
    pub producer_runs_earlier: bool,

    /// Whether the producing command's descriptor declares the referenced
    /// output field
    pub field_declared: bool,
}

impl ReferenceAnalysis {
    /// A reference is resolvable iff its producer runs earlier and declares
    /// the referenced field.
    pub fn resolvable(&self) -> bool {
        self.producer_runs_earlier && self.field_declared
    }
}

/// List every variable reference in the file with its resolvability, in
/// file order. Used by the `variables` CLI command for dry analysis.
pub fn analyze_references(file: &CommandFile) -> Vec<ReferenceAnalysis> {
    let mut analyses = Vec::new();

    for (index, command) in file.commands.iter().enumerate() {
        for (param_name, param_value) in &command.parameters {
            let Some(text) = param_value.as_str() else {
                continue;
            };
            let Some(reference) = parse_reference(text) else {
                continue;
            };

            let producer = file.commands[..index]
                .iter()
                .find(|c| c.name == reference.command);

            let field_declared = producer
                .map(|p| {
                    descriptor_for(p.kind)
                        .outputs
                        .iter()
                        .any(|o| o.name == reference.field)
                })
                .unwrap_or(false);

            analyses.push(ReferenceAnalysis {
                command: command.name.clone(),
                parameter: param_name.clone(),
                reference,
                producer_runs_earlier: producer.is_some(),
                field_declared,
            });
        }
    }

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use payrun_dsl::parse_command_file;

    fn file() -> CommandFile {
        parse_command_file(
            r#"
            version: "1.0"
            commands:
              - name: dep1
                type: deposit
                user: { id: alice@example.com, password: secret }
                parameters: { amount: "100", asset: USD }
              - name: tr1
                type: transfer
                user: { id: alice@example.com, password: secret }
                parameters:
                  amount: "$dep1.amount"
                  asset: "$dep1.missing_field"
                  to: bob@example.com
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolvable_reference() {
        let analyses = analyze_references(&file());
        let amount = analyses
            .iter()
            .find(|a| a.parameter == "amount")
            .unwrap();
        assert!(amount.producer_runs_earlier);
        assert!(amount.field_declared);
        assert!(amount.resolvable());
    }

    #[test]
    fn test_undeclared_field_detected() {
        let analyses = analyze_references(&file());
        let asset = analyses.iter().find(|a| a.parameter == "asset").unwrap();
        assert!(asset.producer_runs_earlier);
        assert!(!asset.field_declared);
        assert!(!asset.resolvable());
    }

    #[test]
    fn test_reference_count() {
        assert_eq!(analyze_references(&file()).len(), 2);
    }
}
