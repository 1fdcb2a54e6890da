//! Operation descriptors and their instances
//!
//! An [`OperationDescriptor`] is the validated, immutable template produced
//! by the factory: it wraps a [`Callable`] and owns the merged metadata.
//! Descriptors are shared behind an `Arc`. An [`OperationInstance`] is one
//! placement of that template in a graph; it copies the template's metadata
//! when created, so filling values or disabling an instance never touches
//! the template or any other instance.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::annotate::Annotations;
use crate::error::{OperationError, Result};
use crate::metadata::OperationMetadata;
use crate::projection::{self, ParameterState, ProjectionConfig};
use crate::signature::{Arguments, Callable};
use crate::types::TypeTag;
use crate::validation::{self, ValidationError};

/// Validated template for an operation
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// Display name
    pub name: String,
    /// Input names, positionally aligned with the callable's parameters
    pub input_names: Vec<String>,
    /// Output names, positionally aligned with the declared return types
    pub output_names: Vec<String>,
    pub metadata: OperationMetadata,
    pub callable: Callable,
}

impl OperationDescriptor {
    /// Create an instance of this operation with its own copy of the metadata
    pub fn instantiate(self: &Arc<Self>) -> OperationInstance {
        OperationInstance {
            descriptor: Arc::clone(self),
            input_names: self.input_names.clone(),
            output_names: self.output_names.clone(),
            metadata: self.metadata.clone(),
            disabled: false,
        }
    }

    /// Reference used to find this operation's callable again after serialization
    ///
    /// This is the callable's intrinsic name, or the operation name when the
    /// callable is anonymous.
    pub fn callable_ref(&self) -> &str {
        self.callable.name().unwrap_or(&self.name)
    }

    /// Declared input types, keyed by input name
    pub fn input_types(&self) -> Vec<(String, Option<TypeTag>)> {
        input_types(&self.callable, &self.input_names)
    }

    /// Declared output types, keyed by output name
    pub fn output_types(&self) -> Vec<(String, Option<TypeTag>)> {
        output_types(&self.callable, &self.output_names)
    }

    /// Every slot of this descriptor as an annotation layer
    ///
    /// Used to derive a new operation that inherits this one's metadata.
    pub fn to_annotations(&self) -> Annotations {
        let metadata = self.metadata.clone();
        Annotations {
            name: Some(self.name.clone()),
            input_names: Some(self.input_names.clone()),
            output_names: Some(self.output_names.clone()),
            filled_values: Some(metadata.filled_values),
            units: Some(metadata.units),
            limits: Some(metadata.limits),
            fixed: Some(metadata.fixed),
            fixable: Some(metadata.fixable),
            visible: Some(metadata.visible),
            opts: Some(metadata.opts),
            output_shape: Some(metadata.output_shape),
            input_descriptions: Some(metadata.input_descriptions),
            output_descriptions: Some(metadata.output_descriptions),
            categories: Some(metadata.categories),
            hints: Some(metadata.hints),
        }
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation named {}", self.name)
    }
}

fn input_types(callable: &Callable, names: &[String]) -> Vec<(String, Option<TypeTag>)> {
    names
        .iter()
        .zip(&callable.signature().parameters)
        .map(|(name, param)| (name.clone(), param.annotation.clone()))
        .collect()
}

fn output_types(callable: &Callable, names: &[String]) -> Vec<(String, Option<TypeTag>)> {
    let mut returns = callable.signature().return_types().into_iter();
    names
        .iter()
        .map(|name| (name.clone(), returns.next()))
        .collect()
}

/// Minimal state needed to rebuild an equivalent instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    /// Callable reference (see [`OperationDescriptor::callable_ref`])
    pub callable: String,
    #[serde(default)]
    pub filled_values: std::collections::BTreeMap<String, serde_json::Value>,
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
}

/// One placement of an operation in a graph
#[derive(Debug, Clone)]
pub struct OperationInstance {
    descriptor: Arc<OperationDescriptor>,
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
    pub metadata: OperationMetadata,
    /// Whether the graph should skip this operation
    pub disabled: bool,
}

impl OperationInstance {
    /// Rebuild an instance from a saved state
    ///
    /// The state must name the descriptor's callable and satisfy the same
    /// naming rules as the descriptor itself; otherwise every problem is
    /// returned as a validation error.
    pub fn restore(descriptor: Arc<OperationDescriptor>, state: OperationState) -> Result<Self> {
        if descriptor.callable_ref() != state.callable {
            return Err(OperationError::CallableMismatch {
                expected: descriptor.callable_ref().to_string(),
                found: state.callable,
            });
        }

        let mut instance = descriptor.instantiate();
        instance.metadata.filled_values = state.filled_values;
        instance.input_names = state.input_names;
        instance.output_names = state.output_names;
        instance.validate()?;
        Ok(instance)
    }

    /// Check this instance's names and metadata against its callable
    pub fn validate(&self) -> Result<()> {
        let snapshot = OperationDescriptor {
            name: self.descriptor.name.clone(),
            input_names: self.input_names.clone(),
            output_names: self.output_names.clone(),
            metadata: self.metadata.clone(),
            callable: self.descriptor.callable.clone(),
        };
        let problems = validation::collect_problems(&snapshot);
        if problems.is_empty() {
            return Ok(());
        }
        Err(ValidationError {
            operation: Box::new(snapshot),
            problems,
        }
        .into())
    }

    /// The template this instance was created from
    pub fn descriptor(&self) -> &Arc<OperationDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The wrapped function
    pub fn callable(&self) -> &Callable {
        &self.descriptor.callable
    }

    /// Pre-bind a value for one of this instance's inputs
    pub fn fill(&mut self, input: &str, value: impl Into<serde_json::Value>) -> Result<()> {
        if !self.input_names.iter().any(|n| n == input) {
            return Err(OperationError::UnknownInput(input.to_string()));
        }
        self.metadata
            .filled_values
            .insert(input.to_string(), value.into());
        Ok(())
    }

    /// Remove a pre-bound value, returning it if it was set
    pub fn clear(&mut self, input: &str) -> Option<serde_json::Value> {
        self.metadata.filled_values.remove(input)
    }

    /// Keyword arguments for a call: caller arguments overlaid on filled values
    pub fn arguments(&self, overrides: Arguments) -> Arguments {
        let mut arguments: Arguments = self
            .metadata
            .filled_values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        arguments.extend(overrides);
        arguments
    }

    pub fn input_types(&self) -> Vec<(String, Option<TypeTag>)> {
        input_types(self.callable(), &self.input_names)
    }

    pub fn output_types(&self) -> Vec<(String, Option<TypeTag>)> {
        output_types(self.callable(), &self.output_names)
    }

    /// Reduce to the minimal serializable state
    pub fn reduce(&self) -> OperationState {
        OperationState {
            callable: self.descriptor.callable_ref().to_string(),
            filled_values: self.metadata.filled_values.clone(),
            input_names: self.input_names.clone(),
            output_names: self.output_names.clone(),
        }
    }

    /// Project the inputs into editor parameter states with the default configuration
    pub fn as_parameters(&self) -> Vec<ParameterState> {
        projection::project(self, &ProjectionConfig::default())
    }
}

impl fmt::Display for OperationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation named {}", self.name())
    }
}
