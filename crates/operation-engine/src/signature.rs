//! Callable handles and their declared signatures
//!
//! A [`Signature`] is the ground truth an operation is checked against: the
//! ordered parameters of the wrapped function, their type annotations and
//! defaults, and the declared return type(s). It is declared next to the
//! function and queried without ever calling it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::TypeTag;

/// Keyword-style argument bundle passed to a wrapped function
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// A declared parameter of a callable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Declared type, absent when unannotated
    pub annotation: Option<TypeTag>,
    /// Default value, absent when the parameter is required
    pub default: Option<serde_json::Value>,
}

impl Parameter {
    /// A typed parameter without a default
    pub fn required(name: impl Into<String>, annotation: TypeTag) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
            default: None,
        }
    }

    /// A typed parameter with a default value
    pub fn optional(
        name: impl Into<String>,
        annotation: TypeTag,
        default: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
            default: Some(default.into()),
        }
    }

    /// A parameter with no type annotation
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    /// Set a default value for this parameter
    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Declared return type of a callable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReturnAnnotation {
    /// A single return value
    Single(TypeTag),
    /// Several return values, in order
    Multiple(Vec<TypeTag>),
}

/// The declared shape of a callable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub returns: Option<ReturnAnnotation>,
}

impl Signature {
    /// Create a signature from its parameters, with no return annotation
    pub fn new(parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
            returns: None,
        }
    }

    /// Declare a single return type
    pub fn returns(mut self, annotation: TypeTag) -> Self {
        self.returns = Some(ReturnAnnotation::Single(annotation));
        self
    }

    /// Declare several return types
    pub fn returns_many(mut self, annotations: impl IntoIterator<Item = TypeTag>) -> Self {
        self.returns = Some(ReturnAnnotation::Multiple(annotations.into_iter().collect()));
        self
    }

    /// Parameter names in declaration order
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Find a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Type annotation of a parameter (None if unknown or unannotated)
    pub fn annotation(&self, name: &str) -> Option<&TypeTag> {
        self.parameter(name).and_then(|p| p.annotation.as_ref())
    }

    /// Default value of a parameter (None if unknown or required)
    pub fn default_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.parameter(name).and_then(|p| p.default.as_ref())
    }

    /// Declared return types, flattened; empty when unannotated
    pub fn return_types(&self) -> Vec<TypeTag> {
        match &self.returns {
            None => Vec::new(),
            Some(ReturnAnnotation::Single(tag)) => vec![tag.clone()],
            Some(ReturnAnnotation::Multiple(tags)) => tags.clone(),
        }
    }
}

type OperationFn = dyn Fn(&Arguments) -> Result<serde_json::Value> + Send + Sync;

/// Opaque handle to a function that can back an operation
///
/// The handle carries the function's intrinsic name (if it has one) and its
/// declared [`Signature`]. Cloning shares the function.
#[derive(Clone)]
pub struct Callable {
    name: Option<String>,
    signature: Signature,
    func: Arc<OperationFn>,
}

impl Callable {
    /// Wrap a named function
    pub fn new<F>(name: impl Into<String>, signature: Signature, func: F) -> Self
    where
        F: Fn(&Arguments) -> Result<serde_json::Value> + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            signature,
            func: Arc::new(func),
        }
    }

    /// Wrap a function that has no intrinsic name
    pub fn anonymous<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&Arguments) -> Result<serde_json::Value> + Send + Sync + 'static,
    {
        Self {
            name: None,
            signature,
            func: Arc::new(func),
        }
    }

    /// The function's intrinsic name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The function's declared signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Run the function with a keyword argument bundle
    pub fn invoke(&self, arguments: &Arguments) -> Result<serde_json::Value> {
        (self.func)(arguments)
    }

    /// Whether two handles share the same function
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
