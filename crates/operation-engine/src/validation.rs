//! Descriptor validation
//!
//! Checks referential integrity between an operation's declared names and
//! all of its per-name metadata, and that the input names match the wrapped
//! callable's parameters. Every problem is collected (not just the first)
//! and reported together.

use std::collections::HashSet;
use std::fmt;

use crate::descriptor::OperationDescriptor;
use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Which side of an operation a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A single inconsistency found in a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProblem {
    /// The operation name is empty
    EmptyName,
    /// Number of input names differs from the callable's parameter count
    InputCountMismatch { declared: usize, expected: usize },
    /// A name appears more than once in the input or output names
    DuplicateName { kind: PortKind, name: String },
    /// A per-input metadata map is keyed by an undeclared input
    UnknownInput { input: String, slot: &'static str },
    /// A per-output metadata map is keyed by an undeclared output
    UnknownOutput { output: String, slot: &'static str },
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Operation name must not be empty."),
            Self::InputCountMismatch { declared, expected } => write!(
                f,
                "Number of input_names given ({}) must match number of inputs for the operation ({}).",
                declared, expected
            ),
            Self::DuplicateName { kind, name } => {
                write!(f, "\"{}\" is declared more than once as an {} name.", name, kind)
            }
            Self::UnknownInput { input, slot } => {
                write!(f, "\"{}\" is not a valid input for \"{}\".", input, slot)
            }
            Self::UnknownOutput { output, slot } => {
                write!(f, "\"{}\" is not a valid output for \"{}\".", output, slot)
            }
        }
    }
}

impl std::error::Error for ValidationProblem {}

/// Validation failure for an operation configuration
///
/// Carries a snapshot of the offending descriptor and every problem found.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub operation: Box<OperationDescriptor>,
    pub problems: Vec<ValidationProblem>,
}

impl ValidationError {
    /// All problems joined into a single explanation
    pub fn message(&self) -> String {
        self.problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether any problem mentions the given input
    pub fn mentions_input(&self, input: &str) -> bool {
        self.problems
            .iter()
            .any(|p| matches!(p, ValidationProblem::UnknownInput { input: i, .. } if i == input))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for {}: {}", self.operation, self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Validate a descriptor
///
/// Emits a warning when no outputs are declared and an info confirmation
/// on success; returns every problem found as one error otherwise.
pub fn validate(
    descriptor: &OperationDescriptor,
    sink: &dyn DiagnosticSink,
) -> Result<(), ValidationError> {
    if descriptor.output_names.is_empty() {
        sink.emit(Diagnostic::warning(
            &descriptor.name,
            format!(
                "No output_names have been specified for your operation {}; \
                 you will not be able to connect its output(s) to any other operations.",
                descriptor
            ),
        ));
    }

    let problems = collect_problems(descriptor);
    if !problems.is_empty() {
        return Err(ValidationError {
            operation: Box::new(descriptor.clone()),
            problems,
        });
    }

    sink.emit(Diagnostic::info(
        &descriptor.name,
        format!("All args for {} are valid.", descriptor),
    ));
    Ok(())
}

/// Collect every problem in a descriptor
pub fn collect_problems(descriptor: &OperationDescriptor) -> Vec<ValidationProblem> {
    let mut problems = Vec::new();

    validate_name(descriptor, &mut problems);
    validate_input_count(descriptor, &mut problems);
    validate_unique(PortKind::Input, &descriptor.input_names, &mut problems);
    validate_unique(PortKind::Output, &descriptor.output_names, &mut problems);
    validate_input_keys(descriptor, &mut problems);
    validate_output_keys(descriptor, &mut problems);

    problems
}

fn validate_name(descriptor: &OperationDescriptor, problems: &mut Vec<ValidationProblem>) {
    if descriptor.name.is_empty() {
        problems.push(ValidationProblem::EmptyName);
    }
}

/// Input names must map 1:1 onto the callable's parameters
fn validate_input_count(descriptor: &OperationDescriptor, problems: &mut Vec<ValidationProblem>) {
    let declared = descriptor.input_names.len();
    let expected = descriptor.callable.signature().arity();
    if declared != expected {
        problems.push(ValidationProblem::InputCountMismatch { declared, expected });
    }
}

fn validate_unique(kind: PortKind, names: &[String], problems: &mut Vec<ValidationProblem>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
            problems.push(ValidationProblem::DuplicateName {
                kind,
                name: name.clone(),
            });
        }
    }
}

fn validate_input_keys(descriptor: &OperationDescriptor, problems: &mut Vec<ValidationProblem>) {
    let inputs: HashSet<&str> = descriptor.input_names.iter().map(String::as_str).collect();
    for (slot, key) in descriptor.metadata.input_keys() {
        if !inputs.contains(key) {
            problems.push(ValidationProblem::UnknownInput {
                input: key.to_string(),
                slot,
            });
        }
    }
}

fn validate_output_keys(descriptor: &OperationDescriptor, problems: &mut Vec<ValidationProblem>) {
    let outputs: HashSet<&str> = descriptor.output_names.iter().map(String::as_str).collect();
    for (slot, key) in descriptor.metadata.output_keys() {
        if !outputs.contains(key) {
            problems.push(ValidationProblem::UnknownOutput {
                output: key.to_string(),
                slot,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Severity};
    use crate::metadata::OperationMetadata;
    use crate::testing::add_callable;
    use crate::types::{Limits, OutputShape};

    fn add_descriptor() -> OperationDescriptor {
        OperationDescriptor {
            name: "add".to_string(),
            input_names: vec!["x".to_string(), "y".to_string()],
            output_names: vec!["sum".to_string()],
            metadata: OperationMetadata::default(),
            callable: add_callable(),
        }
    }

    #[test]
    fn test_valid_descriptor() {
        let sink = CollectingSink::new();
        let result = validate(&add_descriptor(), &sink);
        assert!(result.is_ok());

        let diagnostics = sink.drain();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn test_unknown_input_key() {
        let mut descriptor = add_descriptor();
        descriptor
            .metadata
            .limits
            .insert("z".to_string(), Limits::range(0, 10));

        let err = validate(&descriptor, &CollectingSink::new()).unwrap_err();
        assert!(err.mentions_input("z"));
        assert!(err.to_string().contains("\"z\" is not a valid input for \"limits\""));
        assert_eq!(err.operation.name, "add");
    }

    #[test]
    fn test_every_input_map_is_checked() {
        let mut descriptor = add_descriptor();
        let m = &mut descriptor.metadata;
        m.limits.insert("a".to_string(), Limits::range(0, 1));
        m.units.insert("b".to_string(), "mm".to_string());
        m.fixed.insert("c".to_string(), true);
        m.fixable.insert("d".to_string(), true);
        m.visible.insert("e".to_string(), false);
        m.opts.insert("f".to_string(), serde_json::Map::new());
        m.filled_values.insert("g".to_string(), serde_json::json!(1));
        m.input_descriptions.insert("h".to_string(), "?".to_string());

        let problems = collect_problems(&descriptor);
        assert_eq!(problems.len(), 8);
        for key in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            assert!(problems.iter().any(
                |p| matches!(p, ValidationProblem::UnknownInput { input, .. } if input == key)
            ));
        }
    }

    #[test]
    fn test_unknown_output_key() {
        let mut descriptor = add_descriptor();
        descriptor
            .metadata
            .output_shape
            .insert("product".to_string(), OutputShape::from(1_usize));
        descriptor
            .metadata
            .output_descriptions
            .insert("sum".to_string(), "The sum".to_string());

        let problems = collect_problems(&descriptor);
        assert_eq!(
            problems,
            vec![ValidationProblem::UnknownOutput {
                output: "product".to_string(),
                slot: "output_shape",
            }]
        );
    }

    #[test]
    fn test_input_count_mismatch() {
        let mut descriptor = add_descriptor();
        descriptor.input_names = vec!["only".to_string()];

        let problems = collect_problems(&descriptor);
        assert_eq!(
            problems,
            vec![ValidationProblem::InputCountMismatch {
                declared: 1,
                expected: 2,
            }]
        );
    }

    #[test]
    fn test_empty_name() {
        let mut descriptor = add_descriptor();
        descriptor.name = String::new();
        assert!(collect_problems(&descriptor).contains(&ValidationProblem::EmptyName));
    }

    #[test]
    fn test_duplicate_names_reported_once() {
        let mut descriptor = add_descriptor();
        descriptor.output_names = vec!["sum".to_string(), "sum".to_string(), "sum".to_string()];

        let problems = collect_problems(&descriptor);
        assert_eq!(
            problems,
            vec![ValidationProblem::DuplicateName {
                kind: PortKind::Output,
                name: "sum".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_outputs_is_only_a_warning() {
        let mut descriptor = add_descriptor();
        descriptor.output_names.clear();

        let sink = CollectingSink::new();
        assert!(validate(&descriptor, &sink).is_ok());
        let warnings = sink.at_least(Severity::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("No output_names"));
    }

    #[test]
    fn test_collects_multiple_problems() {
        let mut descriptor = add_descriptor();
        descriptor.name = String::new();
        descriptor.input_names = vec!["x".to_string()];
        descriptor
            .metadata
            .units
            .insert("y".to_string(), "mm".to_string());

        let err = validate(&descriptor, &CollectingSink::new()).unwrap_err();
        assert_eq!(err.problems.len(), 3);
        let message = err.message();
        assert!(message.contains("must not be empty"));
        assert!(message.contains("(1)"));
        assert!(message.contains("\"y\" is not a valid input for \"units\""));
    }
}
