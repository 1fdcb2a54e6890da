//! Parameter projection for editor front-ends
//!
//! Converts an operation instance's inputs into renderer-agnostic parameter
//! state records. Each record is a flat JSON object in the shape property
//! tree widgets consume (`name`, `type`, `value`, `default`, `limits`, ...).
//!
//! Only inputs whose declared type is known to the editor's
//! [`TypeVocabulary`] are projected. Inputs with no type annotation, or with
//! a type the vocabulary does not know, are left out on purpose: the editor
//! has no control to render them with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::OperationInstance;
use crate::error::Result;
use crate::types::TypeTag;

/// Editor type used for enumeration inputs
pub const SELECTION_TYPE: &str = "list";

/// Placeholder choice for an enumeration input with no declared limits
pub const DEFAULT_ENUM_PLACEHOLDER: &str = "---";

/// How the editor renders a resolved input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorType {
    /// A native control, identified by the editor's type name
    Value(String),
    /// A selection from a fixed set of values
    Selection,
}

/// Lookup table from semantic type names to editor type names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeVocabulary {
    types: BTreeMap<String, String>,
}

impl TypeVocabulary {
    /// An empty vocabulary (nothing but enumerations resolves)
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register a semantic type, rendered with the editor type of the same name
    pub fn register(&mut self, type_name: impl Into<String>) {
        let type_name = type_name.into();
        self.types.insert(type_name.clone(), type_name);
    }

    /// Register a semantic type rendered with a differently named editor type
    pub fn register_as(&mut self, type_name: impl Into<String>, editor_type: impl Into<String>) {
        self.types.insert(type_name.into(), editor_type.into());
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Resolve a declared type to an editor type; `None` means "omit"
    pub fn resolve(&self, tag: &TypeTag) -> Option<EditorType> {
        match tag {
            TypeTag::Enumeration => Some(EditorType::Selection),
            other => self
                .types
                .get(other.name())
                .map(|editor| EditorType::Value(editor.clone())),
        }
    }
}

impl Default for TypeVocabulary {
    fn default() -> Self {
        let mut vocabulary = Self::empty();
        for name in [
            "int", "float", "bool", "str", "text", "color", "colormap", "list", "group",
            "action", "file",
        ] {
            vocabulary.register(name);
        }
        vocabulary
    }
}

/// Projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionConfig {
    pub vocabulary: TypeVocabulary,
    /// Sole choice offered by enumeration inputs that declare no limits
    pub enum_placeholder: serde_json::Value,
}

impl ProjectionConfig {
    /// Load settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            vocabulary: TypeVocabulary::default(),
            enum_placeholder: serde_json::Value::from(DEFAULT_ENUM_PLACEHOLDER),
        }
    }
}

/// Editor state of one input parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterState(pub serde_json::Map<String, serde_json::Value>);

impl ParameterState {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(|v| v.as_str())
    }

    /// Editor type name
    pub fn type_name(&self) -> Option<&str> {
        self.get("type").and_then(|v| v.as_str())
    }

    pub fn value(&self) -> Option<&serde_json::Value> {
        self.get("value")
    }

    pub fn default_value(&self) -> Option<&serde_json::Value> {
        self.get("default")
    }

    /// Allowed choices of a selection parameter
    pub fn values(&self) -> Option<&Vec<serde_json::Value>> {
        self.get("values").and_then(|v| v.as_array())
    }

    pub fn limits(&self) -> Option<&serde_json::Value> {
        self.get("limits")
    }

    pub fn units(&self) -> Option<&str> {
        self.get("units").and_then(|v| v.as_str())
    }

    pub fn is_fixed(&self) -> bool {
        self.flag("fixed", false)
    }

    pub fn is_fixable(&self) -> bool {
        self.flag("fixable", false)
    }

    pub fn is_visible(&self) -> bool {
        self.flag("visible", true)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.0.insert(key.to_string(), value.into());
    }
}

/// Project an instance's inputs into editor parameter states
///
/// Inputs are visited in declaration order, each paired positionally with
/// the callable parameter it names. The input's `opts` are applied both
/// before and after the structured fields, so a free-form option can
/// override any of them.
pub fn project(instance: &OperationInstance, config: &ProjectionConfig) -> Vec<ParameterState> {
    let signature = instance.callable().signature();
    let metadata = &instance.metadata;
    let mut states = Vec::new();

    for (name, parameter) in instance.input_names.iter().zip(&signature.parameters) {
        let Some(editor_type) = parameter
            .annotation
            .as_ref()
            .and_then(|tag| config.vocabulary.resolve(tag))
        else {
            log::trace!("Omitting input '{}' of '{}' from projection", name, instance.name());
            continue;
        };

        let opts = metadata.opts.get(name);
        let default = parameter.default.clone().unwrap_or(serde_json::Value::Null);
        let value = metadata
            .filled_values
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.clone());

        let mut state = ParameterState::default();
        apply_opts(&mut state, opts);
        state.set("name", name.as_str());
        state.set("default", default);
        state.set("value", value);
        match editor_type {
            EditorType::Value(type_name) => state.set("type", type_name),
            EditorType::Selection => {
                let values = match metadata.limits.get(name) {
                    Some(limits) => limits.choices(),
                    None => vec![config.enum_placeholder.clone()],
                };
                state.set("values", values);
                state.set("type", SELECTION_TYPE);
            }
        }
        if let Some(limits) = metadata.limits.get(name) {
            state.set("limits", limits.to_value());
        }
        if let Some(units) = metadata.units.get(name) {
            state.set("units", units.as_str());
        }
        state.set("fixed", metadata.is_fixed(name));
        state.set("fixable", metadata.is_fixable(name));
        state.set("visible", metadata.is_visible(name));
        apply_opts(&mut state, opts);

        states.push(state);
    }

    states
}

fn apply_opts(
    state: &mut ParameterState,
    opts: Option<&serde_json::Map<String, serde_json::Value>>,
) {
    if let Some(opts) = opts {
        state.0.extend(opts.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{
        fixable, fixed, input_names, limits, opts, output_names, units, visible, Annotated,
    };
    use crate::factory::operation;
    use crate::signature::{Callable, Parameter, Signature};
    use crate::testing::add_callable;
    use serde_json::json;

    fn threshold_callable() -> Callable {
        Callable::new(
            "threshold",
            Signature::new([
                Parameter::required("data", TypeTag::named("ndarray")),
                Parameter::optional("threshold", TypeTag::Float, 0.5),
                Parameter::untyped("mask"),
                Parameter::optional("mode", TypeTag::Enumeration, "upper"),
            ])
            .returns(TypeTag::named("ndarray")),
            |_| Ok(serde_json::Value::Null),
        )
    }

    #[test]
    fn test_unknown_and_untyped_inputs_are_omitted() {
        let instance = operation(Annotated::new(threshold_callable()).with(output_names("mask")))
            .unwrap()
            .instantiate();

        let states = instance.as_parameters();
        let names: Vec<_> = states.iter().filter_map(|s| s.name()).collect();
        assert_eq!(names, vec!["threshold", "mode"]);
    }

    #[test]
    fn test_value_prefers_filled_over_default() {
        let mut instance = operation(Annotated::new(add_callable()).with(output_names("sum")))
            .unwrap()
            .instantiate();
        instance.fill("y", 40).unwrap();

        let states = instance.as_parameters();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].value(), Some(&json!(1)));
        assert_eq!(states[0].default_value(), Some(&json!(1)));
        assert_eq!(states[1].value(), Some(&json!(40)));
        assert_eq!(states[1].default_value(), Some(&json!(2)));
        assert_eq!(states[1].type_name(), Some("int"));
    }

    #[test]
    fn test_limits_keep_declared_numbers() {
        let instance = operation(
            Annotated::new(add_callable())
                .with(output_names("sum"))
                .with(limits("x", [0, 10]))
                .with(limits("y", [0.5, 2.0])),
        )
        .unwrap()
        .instantiate();

        let states = instance.as_parameters();
        let x = states[0].limits().unwrap();
        assert!(x[0].is_i64() && x[1].is_i64());
        assert_eq!(x, &json!([0, 10]));
        assert_eq!(states[1].limits(), Some(&json!([0.5, 2.0])));
    }

    #[test]
    fn test_structured_fields() {
        let instance = operation(
            Annotated::new(add_callable())
                .with(output_names("sum"))
                .with(limits("x", [0, 10]))
                .with(units("x", "mm"))
                .with(fixed("x", true))
                .with(fixable("x", true))
                .with(visible("y", false)),
        )
        .unwrap()
        .instantiate();

        let states = instance.as_parameters();
        let x = &states[0];
        assert_eq!(x.limits(), Some(&json!([0, 10])));
        assert_eq!(x.units(), Some("mm"));
        assert!(x.is_fixed());
        assert!(x.is_fixable());
        assert!(x.is_visible());

        let y = &states[1];
        assert!(y.limits().is_none());
        assert!(y.units().is_none());
        assert!(!y.is_fixed());
        assert!(!y.is_visible());
    }

    #[test]
    fn test_opts_override_structured_fields() {
        let instance = operation(
            Annotated::new(add_callable())
                .with(output_names("sum"))
                .with(units("x", "mm"))
                .with(opts(
                    "x",
                    [
                        ("type", json!("float")),
                        ("units", json!("cm")),
                        ("step", json!(0.1)),
                    ],
                )),
        )
        .unwrap()
        .instantiate();

        let x = &instance.as_parameters()[0];
        assert_eq!(x.type_name(), Some("float"));
        assert_eq!(x.units(), Some("cm"));
        assert_eq!(x.get("step"), Some(&json!(0.1)));
    }

    #[test]
    fn test_enumeration_without_limits_uses_placeholder() {
        let instance = operation(Annotated::new(threshold_callable()).with(output_names("mask")))
            .unwrap()
            .instantiate();

        let states = instance.as_parameters();
        let mode = states.iter().find(|s| s.name() == Some("mode")).unwrap();
        assert_eq!(mode.type_name(), Some(SELECTION_TYPE));
        assert_eq!(mode.values(), Some(&vec![json!("---")]));
        assert_eq!(mode.value(), Some(&json!("upper")));
        assert!(mode.limits().is_none());
    }

    #[test]
    fn test_enumeration_values_from_limits() {
        let instance = operation(
            Annotated::new(threshold_callable())
                .with(output_names("mask"))
                .with(limits("mode", crate::types::Limits::values(["upper", "lower"]))),
        )
        .unwrap()
        .instantiate();

        let states = instance.as_parameters();
        let mode = states.iter().find(|s| s.name() == Some("mode")).unwrap();
        assert_eq!(mode.values(), Some(&vec![json!("upper"), json!("lower")]));
        assert_eq!(mode.limits(), Some(&json!(["upper", "lower"])));
    }

    #[test]
    fn test_custom_vocabulary() {
        let instance = operation(Annotated::new(threshold_callable()).with(output_names("mask")))
            .unwrap()
            .instantiate();

        let mut config = ProjectionConfig::default();
        config.vocabulary.register_as("ndarray", "image");
        let states = project(&instance, &config);
        let data = states.iter().find(|s| s.name() == Some("data")).unwrap();
        assert_eq!(data.type_name(), Some("image"));
        assert_eq!(data.default_value(), Some(&serde_json::Value::Null));

        let empty = ProjectionConfig {
            vocabulary: TypeVocabulary::empty(),
            ..ProjectionConfig::default()
        };
        let names: Vec<_> = project(&instance, &empty)
            .iter()
            .filter_map(|s| s.name().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["mode"]);
    }

    #[test]
    fn test_renamed_inputs_project_by_position() {
        let mut instance = operation(
            Annotated::new(add_callable())
                .with(input_names(["first", "second"]))
                .with(output_names("sum")),
        )
        .unwrap()
        .instantiate();
        instance.fill("second", 9).unwrap();

        let states = instance.as_parameters();
        assert_eq!(states[0].name(), Some("first"));
        assert_eq!(states[0].value(), Some(&json!(1)));
        assert_eq!(states[1].name(), Some("second"));
        assert_eq!(states[1].value(), Some(&json!(9)));
    }

    #[test]
    fn test_config_from_json() {
        let config = ProjectionConfig::from_json(
            r#"{"vocabulary": {"int": "int", "ndarray": "image"}, "enumPlaceholder": "(none)"}"#,
        )
        .unwrap();
        assert!(config.vocabulary.contains("ndarray"));
        assert!(!config.vocabulary.contains("float"));
        assert_eq!(config.enum_placeholder, json!("(none)"));

        let defaults = ProjectionConfig::from_json("{}").unwrap();
        assert_eq!(defaults, ProjectionConfig::default());
    }

    #[test]
    fn test_parameter_state_serializes_flat() {
        let instance = operation(Annotated::new(add_callable()).with(output_names("sum")))
            .unwrap()
            .instantiate();
        let json = serde_json::to_value(&instance.as_parameters()[0]).unwrap();
        assert_eq!(json["name"], "x");
        assert_eq!(json["type"], "int");
        assert_eq!(json["visible"], true);
    }
}
