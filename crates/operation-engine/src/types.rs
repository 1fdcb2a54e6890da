//! Core value types shared by annotations, descriptors and projections
//!
//! These types describe the vocabulary an operation is declared with:
//! semantic type tags for parameters, numeric limits, output shapes,
//! menu category paths and opaque plot hints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type declared for a parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    /// Integer number
    Int,
    /// Floating point number
    Float,
    /// Boolean flag
    Bool,
    /// Text string
    Str,
    /// Enumeration; rendered as a selection from a fixed set of values
    Enumeration,
    /// Any other named type (e.g. "ndarray", "color")
    Named(String),
}

impl TypeTag {
    /// The canonical name of this type
    pub fn name(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Enumeration => "Enum",
            Self::Named(name) => name,
        }
    }

    /// Create a tag for an arbitrary named type
    pub fn named(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        match name.as_str() {
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "str" => Self::Str,
            "Enum" => Self::Enumeration,
            _ => Self::Named(name),
        }
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.name().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Allowed values for an input
///
/// Numeric inputs use an inclusive `[low, high]` range. Enumeration inputs
/// use an explicit list of choices. Bounds are kept exactly as declared, so
/// an integer range stays integral when projected.
///
/// Serialized with the shape as the key (`{"range": [0, 10]}` or
/// `{"values": ["a", "b"]}`); a two-element choice list never reads back as
/// a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limits {
    /// Inclusive lower and upper bound
    Range(serde_json::Value, serde_json::Value),
    /// Explicit set of allowed values
    Values(Vec<serde_json::Value>),
}

impl Limits {
    /// Create an inclusive range
    pub fn range(low: impl Into<serde_json::Value>, high: impl Into<serde_json::Value>) -> Self {
        Self::Range(low.into(), high.into())
    }

    /// Create a set of allowed values
    pub fn values<V: Into<serde_json::Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    /// The limits as a list of values (a range yields its two bounds)
    pub fn choices(&self) -> Vec<serde_json::Value> {
        match self {
            Self::Range(low, high) => vec![low.clone(), high.clone()],
            Self::Values(values) => values.clone(),
        }
    }

    /// The limits as a JSON array
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Array(self.choices())
    }
}

impl<T: Into<serde_json::Value>> From<(T, T)> for Limits {
    fn from((low, high): (T, T)) -> Self {
        Self::range(low, high)
    }
}

impl<T: Into<serde_json::Value>> From<[T; 2]> for Limits {
    fn from([low, high]: [T; 2]) -> Self {
        Self::range(low, high)
    }
}

/// Expected dimensions of an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputShape(pub Vec<usize>);

impl From<usize> for OutputShape {
    fn from(dim: usize) -> Self {
        Self(vec![dim])
    }
}

impl From<Vec<usize>> for OutputShape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl<const N: usize> From<[usize; N]> for OutputShape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

/// A menu path; each label is one level deeper in the menu
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryPath(pub Vec<String>);

impl CategoryPath {
    /// The labels of this path, outermost first
    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for CategoryPath {
    fn from(label: &str) -> Self {
        Self(vec![label.to_string()])
    }
}

impl From<String> for CategoryPath {
    fn from(label: String) -> Self {
        Self(vec![label])
    }
}

impl From<Vec<&str>> for CategoryPath {
    fn from(labels: Vec<&str>) -> Self {
        Self(labels.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for CategoryPath {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl<const N: usize> From<[&str; N]> for CategoryPath {
    fn from(labels: [&str; N]) -> Self {
        Self(labels.iter().map(|s| s.to_string()).collect())
    }
}

/// Opaque plotting hint attached to an operation
///
/// The engine never interprets hints; it only carries the positional and
/// keyword arguments they were declared with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotHint {
    /// Positional arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
    /// Keyword arguments
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub kwargs: serde_json::Map<String, serde_json::Value>,
}

impl PlotHint {
    /// Create a hint from positional arguments
    pub fn new<V: Into<serde_json::Value>>(args: impl IntoIterator<Item = V>) -> Self {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            kwargs: serde_json::Map::new(),
        }
    }

    /// Add a keyword argument
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

/// An ordered sequence of input or output names
///
/// A bare string converts into a single-element sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names(pub Vec<String>);

impl Names {
    /// Unwrap into the list of names
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}
