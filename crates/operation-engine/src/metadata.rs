//! Resolved metadata carried by descriptors and instances

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryPath, Limits, OutputShape, PlotHint};

/// Per-input and per-output metadata of an operation
///
/// Maps are keyed by input or output name. A missing key means the field
/// was never set for that name; see the accessors for the effective
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    /// Pre-bound input values
    #[serde(default)]
    pub filled_values: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub limits: BTreeMap<String, Limits>,
    #[serde(default)]
    pub units: BTreeMap<String, String>,
    #[serde(default)]
    pub fixed: BTreeMap<String, bool>,
    #[serde(default)]
    pub fixable: BTreeMap<String, bool>,
    #[serde(default)]
    pub visible: BTreeMap<String, bool>,
    /// Free-form editor options per input
    #[serde(default)]
    pub opts: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub input_descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub output_shape: BTreeMap<String, OutputShape>,
    #[serde(default)]
    pub output_descriptions: BTreeMap<String, String>,
    /// Menu paths the operation is listed under
    #[serde(default)]
    pub categories: Vec<CategoryPath>,
    #[serde(default)]
    pub hints: Vec<PlotHint>,
}

impl OperationMetadata {
    /// Whether an input is shown in editors (defaults to true)
    pub fn is_visible(&self, input: &str) -> bool {
        self.visible.get(input).copied().unwrap_or(true)
    }

    /// Whether an input is locked (defaults to false)
    pub fn is_fixed(&self, input: &str) -> bool {
        self.fixed.get(input).copied().unwrap_or(false)
    }

    /// Whether an input may be locked (defaults to false)
    pub fn is_fixable(&self, input: &str) -> bool {
        self.fixable.get(input).copied().unwrap_or(false)
    }

    /// Keys of every input-keyed map, labelled with the map they came from
    pub fn input_keys(&self) -> Vec<(&'static str, &str)> {
        let mut keys = Vec::new();
        collect_keys(&mut keys, "fixable", &self.fixable);
        collect_keys(&mut keys, "fixed", &self.fixed);
        collect_keys(&mut keys, "limits", &self.limits);
        collect_keys(&mut keys, "opts", &self.opts);
        collect_keys(&mut keys, "units", &self.units);
        collect_keys(&mut keys, "visible", &self.visible);
        collect_keys(&mut keys, "filled_values", &self.filled_values);
        collect_keys(&mut keys, "input_descriptions", &self.input_descriptions);
        keys
    }

    /// Keys of every output-keyed map, labelled with the map they came from
    pub fn output_keys(&self) -> Vec<(&'static str, &str)> {
        let mut keys = Vec::new();
        collect_keys(&mut keys, "output_shape", &self.output_shape);
        collect_keys(&mut keys, "output_descriptions", &self.output_descriptions);
        keys
    }
}

fn collect_keys<'a, V>(
    keys: &mut Vec<(&'static str, &'a str)>,
    slot: &'static str,
    map: &'a BTreeMap<String, V>,
) {
    keys.extend(map.keys().map(|k| (slot, k.as_str())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults() {
        let mut metadata = OperationMetadata::default();
        assert!(metadata.is_visible("x"));
        assert!(!metadata.is_fixed("x"));
        assert!(!metadata.is_fixable("x"));

        metadata.visible.insert("x".to_string(), false);
        metadata.fixed.insert("x".to_string(), true);
        assert!(!metadata.is_visible("x"));
        assert!(metadata.is_fixed("x"));
    }

    #[test]
    fn test_keys_are_labelled_by_slot() {
        let mut metadata = OperationMetadata::default();
        metadata.units.insert("x".to_string(), "mm".to_string());
        metadata.limits.insert("z".to_string(), Limits::range(0, 10));
        metadata.output_shape.insert("sum".to_string(), OutputShape::from(1_usize));

        let inputs = metadata.input_keys();
        assert!(inputs.contains(&("units", "x")));
        assert!(inputs.contains(&("limits", "z")));
        assert_eq!(metadata.output_keys(), vec![("output_shape", "sum")]);
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let mut metadata = OperationMetadata::default();
        metadata
            .filled_values
            .insert("x".to_string(), serde_json::json!(3));

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["filledValues"]["x"], 3);
        assert!(json.get("outputShape").is_some());
    }
}
