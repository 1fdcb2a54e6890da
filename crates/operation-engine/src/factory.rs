//! Operation factory
//!
//! Merges explicit overrides, accumulated annotations and the callable's
//! own signature into a validated [`OperationDescriptor`].
//!
//! Precedence, per field: an explicit override wins over an annotation,
//! which wins over the field's introspected default:
//!
//! | field         | default                              |
//! |---------------|--------------------------------------|
//! | `name`        | the callable's intrinsic name        |
//! | `input_names` | the signature's parameter names      |
//! | `output_names`| none                                 |
//! | everything else | empty                              |

use std::sync::Arc;

use crate::annotate::{Annotated, Annotations};
use crate::descriptor::OperationDescriptor;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::{OperationError, Result};
use crate::metadata::OperationMetadata;
use crate::signature::Callable;
use crate::validation;

/// Builds validated operation descriptors
///
/// Diagnostics produced while building (missing outputs, validation
/// failures, success confirmations) are sent to the factory's sink.
#[derive(Clone)]
pub struct OperationFactory {
    sink: Arc<dyn DiagnosticSink>,
}

impl OperationFactory {
    /// Create a factory that reports through the `log` facade
    pub fn new() -> Self {
        Self {
            sink: Arc::new(LogSink),
        }
    }

    /// Create a factory that reports to the given sink
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Build a descriptor from an annotated callable and explicit overrides
    ///
    /// Fails with [`OperationError::Unnamed`] if no name can be resolved and
    /// with [`OperationError::Validation`] if the merged metadata is
    /// inconsistent. Each call produces a fresh descriptor; nothing is
    /// shared between descriptors except the callable itself.
    pub fn build(
        &self,
        annotated: impl Into<Annotated>,
        overrides: Annotations,
    ) -> Result<Arc<OperationDescriptor>> {
        let Annotated {
            callable,
            annotations,
        } = annotated.into();

        let descriptor = merge(callable, overrides, annotations)?;
        log::debug!(
            "Built operation '{}' with inputs {:?} and outputs {:?}",
            descriptor.name,
            descriptor.input_names,
            descriptor.output_names
        );

        if let Err(err) = validation::validate(&descriptor, self.sink.as_ref()) {
            self.sink
                .emit(Diagnostic::error(&descriptor.name, err.to_string()));
            return Err(err.into());
        }

        Ok(Arc::new(descriptor))
    }

    /// Build a descriptor that inherits every slot of `base`
    ///
    /// Annotations on `annotated` override the inherited slots. The base's
    /// name is only inherited by an anonymous callable. The input names are
    /// only inherited when the new callable has the same arity, and inherited
    /// per-input metadata is kept only for inputs the new operation declares.
    pub fn derive(
        &self,
        base: &OperationDescriptor,
        annotated: impl Into<Annotated>,
        overrides: Annotations,
    ) -> Result<Arc<OperationDescriptor>> {
        let annotated = annotated.into();
        let signature = annotated.callable.signature();

        let mut inherited = base.to_annotations();
        if annotated.callable.name().is_some() {
            inherited.name = None;
        }
        if signature.arity() != base.input_names.len() {
            inherited.input_names = None;
        }

        let inputs = overrides
            .input_names
            .clone()
            .or_else(|| annotated.annotations.input_names.clone())
            .or_else(|| inherited.input_names.clone())
            .unwrap_or_else(|| signature.parameter_names());
        inherited.retain_inputs(&inputs);

        let annotations = merge_layers(annotated.annotations, inherited);
        self.build(
            Annotated {
                callable: annotated.callable,
                annotations,
            },
            overrides,
        )
    }
}

impl Default for OperationFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a descriptor with the default factory and no overrides
pub fn operation(annotated: impl Into<Annotated>) -> Result<Arc<OperationDescriptor>> {
    OperationFactory::new().build(annotated, Annotations::new())
}

/// Resolve every field of a descriptor from the three sources
fn merge(
    callable: Callable,
    explicit: Annotations,
    attached: Annotations,
) -> Result<OperationDescriptor> {
    let layer = merge_layers(explicit, attached);

    let name = layer
        .name
        .or_else(|| callable.name().map(str::to_string))
        .ok_or(OperationError::Unnamed)?;
    let input_names = layer
        .input_names
        .unwrap_or_else(|| callable.signature().parameter_names());
    let output_names = layer.output_names.unwrap_or_default();

    let metadata = OperationMetadata {
        filled_values: layer.filled_values.unwrap_or_default(),
        limits: layer.limits.unwrap_or_default(),
        units: layer.units.unwrap_or_default(),
        fixed: layer.fixed.unwrap_or_default(),
        fixable: layer.fixable.unwrap_or_default(),
        visible: layer.visible.unwrap_or_default(),
        opts: layer.opts.unwrap_or_default(),
        input_descriptions: layer.input_descriptions.unwrap_or_default(),
        output_shape: layer.output_shape.unwrap_or_default(),
        output_descriptions: layer.output_descriptions.unwrap_or_default(),
        categories: layer.categories.unwrap_or_default(),
        hints: layer.hints.unwrap_or_default(),
    };

    Ok(OperationDescriptor {
        name,
        input_names,
        output_names,
        metadata,
        callable,
    })
}

/// Slot-by-slot merge: a set slot in `high` replaces the slot in `low`
fn merge_layers(high: Annotations, low: Annotations) -> Annotations {
    Annotations {
        name: high.name.or(low.name),
        input_names: high.input_names.or(low.input_names),
        output_names: high.output_names.or(low.output_names),
        filled_values: high.filled_values.or(low.filled_values),
        units: high.units.or(low.units),
        limits: high.limits.or(low.limits),
        fixed: high.fixed.or(low.fixed),
        fixable: high.fixable.or(low.fixable),
        visible: high.visible.or(low.visible),
        opts: high.opts.or(low.opts),
        output_shape: high.output_shape.or(low.output_shape),
        input_descriptions: high.input_descriptions.or(low.input_descriptions),
        output_descriptions: high.output_descriptions.or(low.output_descriptions),
        categories: high.categories.or(low.categories),
        hints: high.hints.or(low.hints),
    }
}
