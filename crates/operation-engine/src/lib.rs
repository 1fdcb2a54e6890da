//! Operation Engine - declarative operation descriptors for dataflow graphs
//!
//! This crate turns a plain function into a reusable, introspectable
//! operation node. It provides:
//!
//! - Composable metadata annotators (names, units, limits, visibility, ...)
//! - A factory that merges annotations with the function's declared signature
//! - Validation that reports every inconsistency at once
//! - A renderer-agnostic parameter projection for property editors
//! - A registry for reconstructing serialized instances and building menus
//!
//! The wrapped function is never called while an operation is declared,
//! validated or projected.
//!
//! # Example
//!
//! ```ignore
//! use operation_engine::annotate::{limits, output_names, units};
//! use operation_engine::{operation, Annotated, Callable, Parameter, Signature, TypeTag};
//!
//! let add = Callable::new(
//!     "add",
//!     Signature::new([
//!         Parameter::optional("x", TypeTag::Int, 1),
//!         Parameter::optional("y", TypeTag::Int, 2),
//!     ])
//!     .returns(TypeTag::Int),
//!     |args| Ok(serde_json::json!(args["x"].as_i64() + args["y"].as_i64())),
//! );
//!
//! let descriptor = operation(
//!     Annotated::new(add)
//!         .with(output_names("sum"))
//!         .with(units("x", "mm"))
//!         .with(limits("x", [0, 10])),
//! )?;
//! let parameters = descriptor.instantiate().as_parameters();
//! ```

pub mod annotate;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod metadata;
pub mod projection;
pub mod registry;
pub mod signature;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

// Re-export key types
pub use annotate::{Annotated, Annotation, Annotations};
pub use descriptor::{OperationDescriptor, OperationInstance, OperationState};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink, NullSink, Severity};
pub use error::{OperationError, Result};
pub use factory::{operation, OperationFactory};
pub use metadata::OperationMetadata;
pub use projection::{project, EditorType, ParameterState, ProjectionConfig, TypeVocabulary};
pub use registry::{CategoryMenu, OperationRegistry};
pub use signature::{Arguments, Callable, Parameter, ReturnAnnotation, Signature};
pub use types::{CategoryPath, Limits, Names, OutputShape, PlotHint, TypeTag};
pub use validation::{collect_problems, validate, PortKind, ValidationError, ValidationProblem};
