//! Error types for the operation engine

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using OperationError
pub type Result<T> = std::result::Result<T, OperationError>;

/// Errors that can occur while declaring, instantiating or restoring operations
#[derive(Debug, Error)]
pub enum OperationError {
    /// No name could be resolved from overrides, annotations or the callable
    #[error("The provided operation is unnamed")]
    Unnamed,

    /// The merged metadata failed validation
    #[error(transparent)]
    Validation(Box<ValidationError>),

    /// An instance was asked to fill an input it does not declare
    #[error("Unknown input: {0}")]
    UnknownInput(String),

    /// No template is registered for a callable reference
    #[error("No operation registered for callable '{0}'")]
    UnregisteredCallable(String),

    /// A saved state was restored onto a descriptor wrapping a different callable
    #[error("State for callable '{found}' cannot be restored onto '{expected}'")]
    CallableMismatch { expected: String, found: String },

    /// The wrapped function reported a failure
    #[error("Operation '{operation}' failed: {message}")]
    Invocation { operation: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OperationError {
    /// Create an invocation error with a message
    pub fn invocation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invocation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Access the validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for OperationError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(Box::new(err))
    }
}
