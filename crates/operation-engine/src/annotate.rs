//! Composable metadata annotators
//!
//! Each annotator function returns an [`Annotation`]: a single edit to one
//! named metadata slot. Annotations are accumulated on an [`Annotated`]
//! callable in any order before it is handed to the factory. Nothing here
//! calls or inspects the wrapped function.
//!
//! # Example
//!
//! ```ignore
//! use operation_engine::annotate::{limits, output_names, units};
//!
//! let annotated = Annotated::new(add)
//!     .with(output_names("sum"))
//!     .with(units("x", "mm"))
//!     .with(limits("x", [0, 10]));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::signature::Callable;
use crate::types::{CategoryPath, Limits, Names, OutputShape, PlotHint};

/// A single edit to one metadata slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum Annotation {
    DisplayName { name: String },
    InputNames { names: Vec<String> },
    OutputNames { names: Vec<String> },
    FilledValue { input: String, value: serde_json::Value },
    Units { input: String, unit: String },
    Limits { input: String, limits: Limits },
    Fixed { input: String, fixed: bool },
    Fixable { input: String, fixable: bool },
    Visible { input: String, visible: bool },
    Opts { input: String, options: serde_json::Map<String, serde_json::Value> },
    OutputShape { output: String, shape: OutputShape },
    DescribeInput { input: String, description: String },
    DescribeOutput { output: String, description: String },
    Categories { paths: Vec<CategoryPath> },
    PlotHint { hint: PlotHint },
}

/// Set the name the operation is displayed with
pub fn display_name(name: impl Into<String>) -> Annotation {
    Annotation::DisplayName { name: name.into() }
}

/// Replace the input names; a bare string is a single name
pub fn input_names(names: impl Into<Names>) -> Annotation {
    Annotation::InputNames {
        names: names.into().into_vec(),
    }
}

/// Replace the output names; a bare string is a single name
pub fn output_names(names: impl Into<Names>) -> Annotation {
    Annotation::OutputNames {
        names: names.into().into_vec(),
    }
}

/// Pre-bind a value for an input
pub fn filled_value(input: impl Into<String>, value: impl Into<serde_json::Value>) -> Annotation {
    Annotation::FilledValue {
        input: input.into(),
        value: value.into(),
    }
}

/// Attach a unit of measurement (e.g. "mm") to an input
pub fn units(input: impl Into<String>, unit: impl Into<String>) -> Annotation {
    Annotation::Units {
        input: input.into(),
        unit: unit.into(),
    }
}

/// Restrict the allowed values of an input
pub fn limits(input: impl Into<String>, limits: impl Into<Limits>) -> Annotation {
    Annotation::Limits {
        input: input.into(),
        limits: limits.into(),
    }
}

/// Lock or unlock an input's value
pub fn fixed(input: impl Into<String>, fixed: bool) -> Annotation {
    Annotation::Fixed {
        input: input.into(),
        fixed,
    }
}

/// Declare whether an input may be locked
pub fn fixable(input: impl Into<String>, fixable: bool) -> Annotation {
    Annotation::Fixable {
        input: input.into(),
        fixable,
    }
}

/// Show or hide an input in editors
pub fn visible(input: impl Into<String>, visible: bool) -> Annotation {
    Annotation::Visible {
        input: input.into(),
        visible,
    }
}

/// Merge free-form editor options into an input's option bag
pub fn opts<K, V>(input: impl Into<String>, options: impl IntoIterator<Item = (K, V)>) -> Annotation
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    Annotation::Opts {
        input: input.into(),
        options: options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    }
}

/// Declare the expected shape of an output
pub fn output_shape(output: impl Into<String>, shape: impl Into<OutputShape>) -> Annotation {
    Annotation::OutputShape {
        output: output.into(),
        shape: shape.into(),
    }
}

/// Describe an input for users
pub fn describe_input(input: impl Into<String>, description: impl Into<String>) -> Annotation {
    Annotation::DescribeInput {
        input: input.into(),
        description: description.into(),
    }
}

/// Describe an output for users
pub fn describe_output(output: impl Into<String>, description: impl Into<String>) -> Annotation {
    Annotation::DescribeOutput {
        output: output.into(),
        description: description.into(),
    }
}

/// Append menu category paths
pub fn categories<P: Into<CategoryPath>>(paths: impl IntoIterator<Item = P>) -> Annotation {
    Annotation::Categories {
        paths: paths.into_iter().map(Into::into).collect(),
    }
}

/// Append a plot hint
pub fn plot_hint(hint: PlotHint) -> Annotation {
    Annotation::PlotHint { hint }
}

/// Accumulated metadata slots
///
/// Every slot starts out unset and is created empty on first use. An unset
/// slot means "no opinion", so the factory falls through to the next source.
/// The same structure carries explicit overrides into the factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub name: Option<String>,
    pub input_names: Option<Vec<String>>,
    pub output_names: Option<Vec<String>>,
    pub filled_values: Option<BTreeMap<String, serde_json::Value>>,
    pub units: Option<BTreeMap<String, String>>,
    pub limits: Option<BTreeMap<String, Limits>>,
    pub fixed: Option<BTreeMap<String, bool>>,
    pub fixable: Option<BTreeMap<String, bool>>,
    pub visible: Option<BTreeMap<String, bool>>,
    pub opts: Option<BTreeMap<String, serde_json::Map<String, serde_json::Value>>>,
    pub output_shape: Option<BTreeMap<String, OutputShape>>,
    pub input_descriptions: Option<BTreeMap<String, String>>,
    pub output_descriptions: Option<BTreeMap<String, String>>,
    pub categories: Option<Vec<CategoryPath>>,
    pub hints: Option<Vec<PlotHint>>,
}

impl Annotations {
    /// Create an empty set of annotations
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an annotation, returning the updated set
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.apply(annotation);
        self
    }

    /// Apply an annotation in place
    pub fn apply(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::DisplayName { name } => self.name = Some(name),
            Annotation::InputNames { names } => self.input_names = Some(names),
            Annotation::OutputNames { names } => self.output_names = Some(names),
            Annotation::FilledValue { input, value } => {
                quick_set(&mut self.filled_values, input, value);
            }
            Annotation::Units { input, unit } => quick_set(&mut self.units, input, unit),
            Annotation::Limits { input, limits } => quick_set(&mut self.limits, input, limits),
            Annotation::Fixed { input, fixed } => quick_set(&mut self.fixed, input, fixed),
            Annotation::Fixable { input, fixable } => {
                quick_set(&mut self.fixable, input, fixable);
            }
            Annotation::Visible { input, visible } => {
                quick_set(&mut self.visible, input, visible);
            }
            Annotation::Opts { input, options } => {
                self.opts
                    .get_or_insert_with(BTreeMap::new)
                    .entry(input)
                    .or_default()
                    .extend(options);
            }
            Annotation::OutputShape { output, shape } => {
                quick_set(&mut self.output_shape, output, shape);
            }
            Annotation::DescribeInput { input, description } => {
                quick_set(&mut self.input_descriptions, input, description);
            }
            Annotation::DescribeOutput {
                output,
                description,
            } => quick_set(&mut self.output_descriptions, output, description),
            Annotation::Categories { paths } => {
                self.categories.get_or_insert_with(Vec::new).extend(paths);
            }
            Annotation::PlotHint { hint } => self.hints.get_or_insert_with(Vec::new).push(hint),
        }
    }
}

impl Annotations {
    /// Drop input-keyed entries for inputs not in `inputs`
    pub(crate) fn retain_inputs(&mut self, inputs: &[String]) {
        let keep = |key: &String| inputs.contains(key);
        retain_keys(&mut self.filled_values, keep);
        retain_keys(&mut self.units, keep);
        retain_keys(&mut self.limits, keep);
        retain_keys(&mut self.fixed, keep);
        retain_keys(&mut self.fixable, keep);
        retain_keys(&mut self.visible, keep);
        retain_keys(&mut self.opts, keep);
        retain_keys(&mut self.input_descriptions, keep);
    }
}

fn retain_keys<V>(slot: &mut Option<BTreeMap<String, V>>, keep: impl Fn(&String) -> bool) {
    if let Some(map) = slot {
        map.retain(|key, _| keep(key));
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut annotations = Self::new();
        for annotation in iter {
            annotations.apply(annotation);
        }
        annotations
    }
}

fn quick_set<V>(slot: &mut Option<BTreeMap<String, V>>, key: String, value: V) {
    slot.get_or_insert_with(BTreeMap::new).insert(key, value);
}

/// A callable together with the annotations accumulated on it
#[derive(Debug, Clone)]
pub struct Annotated {
    pub callable: Callable,
    pub annotations: Annotations,
}

impl Annotated {
    /// Start annotating a callable
    pub fn new(callable: Callable) -> Self {
        Self {
            callable,
            annotations: Annotations::new(),
        }
    }

    /// Apply an annotation
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.annotations.apply(annotation);
        self
    }

    /// Apply several annotations in order
    pub fn with_all(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        for annotation in annotations {
            self.annotations.apply(annotation);
        }
        self
    }
}

impl From<Callable> for Annotated {
    fn from(callable: Callable) -> Self {
        Self::new(callable)
    }
}
