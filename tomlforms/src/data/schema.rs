//! Property definitions and schema parsing.
//!
//! Two layouts are understood:
//!
//! - a JSON Schema document whose top-level `properties` reference object
//!   definitions (one per module) and scalar settings (global keys);
//! - a flat map `{ module: [ { name, type, minimum?, maximum?, default? } ] }`.
//!
//! Only boolean, integer, string and array properties are kept; anything
//! else has no editing control and is skipped.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{data::value::FieldValue, error::SchemaError};

/// Declared type of a property, one per control kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Rendered as a toggle.
    #[serde(alias = "bool")]
    Boolean,
    /// Rendered as a bounded numeric field.
    #[serde(alias = "int")]
    Integer,
    /// Rendered as a single-line text field.
    String,
    /// Rendered as a multi-line field, one entry per line.
    Array,
}

impl PropertyType {
    fn from_json_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            _ => None,
        }
    }
}

/// One editable key of a module or of the global section.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Key name in the document.
    pub name: String,
    /// Declared type.
    pub ty: PropertyType,
    /// Inclusive lower bound for integers.
    pub minimum: Option<i64>,
    /// Inclusive upper bound for integers.
    pub maximum: Option<i64>,
    /// Value assumed when the key is absent.
    pub default: Option<FieldValue>,
    /// Element type for arrays (`String` or `Integer`).
    pub item_type: PropertyType,
    /// Human readable help text.
    pub description: Option<String>,
}

impl PropertyDef {
    /// Definition without bounds, default or description.
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Self {
            name: name.into(),
            ty,
            minimum: None,
            maximum: None,
            default: None,
            item_type: PropertyType::String,
            description: None,
        }
    }

    /// Set integer bounds.
    pub fn with_bounds(mut self, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Keys every module panel starts with, in display order.
pub const FIXED_FIELDS: [&str; 4] = ["format", "style", "symbol", "disabled"];

/// Global keys shown first on the global settings panel.
pub const FIXED_GLOBAL_FIELDS: [&str; 3] = ["add_newline", "format", "right_format"];

/// Field set used for every module while no schema is available.
pub fn fallback_properties() -> Vec<PropertyDef> {
    vec![
        PropertyDef::new("format", PropertyType::String),
        PropertyDef::new("style", PropertyType::String),
        PropertyDef::new("symbol", PropertyType::String),
        PropertyDef::new("disabled", PropertyType::Boolean).with_default(FieldValue::Boolean(false)),
    ]
}

/// Global settings used while no schema is available.
pub fn fallback_global_properties() -> Vec<PropertyDef> {
    vec![
        PropertyDef::new("add_newline", PropertyType::Boolean)
            .with_default(FieldValue::Boolean(true)),
        PropertyDef::new("format", PropertyType::String),
        PropertyDef::new("right_format", PropertyType::String),
        PropertyDef::new("scan_timeout", PropertyType::Integer)
            .with_bounds(Some(0), None)
            .with_default(FieldValue::Integer(30)),
        PropertyDef::new("command_timeout", PropertyType::Integer)
            .with_bounds(Some(0), None)
            .with_default(FieldValue::Integer(500)),
    ]
}

/// Parsed schema: ordered property definitions per module plus global keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    modules: IndexMap<String, Vec<PropertyDef>>,
    global: Vec<PropertyDef>,
}

impl Schema {
    /// Build a schema from already decoded parts.
    pub fn new(modules: IndexMap<String, Vec<PropertyDef>>, global: Vec<PropertyDef>) -> Self {
        Self { modules, global }
    }

    /// Parse either supported layout.
    pub fn from_json(json: &Value) -> Result<Self, SchemaError> {
        let Value::Object(root) = json else {
            return Err(SchemaError::Layout("expected a JSON object".to_string()));
        };
        if let Some(Value::Object(properties)) = root.get("properties") {
            return Ok(Self::from_json_schema(root, properties));
        }
        if root.values().all(Value::is_array) {
            return Self::from_flat_map(root);
        }
        Err(SchemaError::Layout(
            "neither `properties` nor a module map".to_string(),
        ))
    }

    fn from_json_schema(root: &Map<String, Value>, properties: &Map<String, Value>) -> Self {
        let defs = root
            .get("definitions")
            .or_else(|| root.get("$defs"))
            .and_then(Value::as_object);

        let mut schema = Self::default();
        for (name, prop) in properties {
            if name.starts_with('$') {
                continue;
            }
            let Some(resolved) = resolve(prop, defs) else {
                debug!("schema: unresolved reference for `{name}`");
                continue;
            };
            if let Some(Value::Object(fields)) = resolved.get("properties") {
                let module_defaults = prop.get("default").and_then(Value::as_object);
                let list = fields
                    .iter()
                    .filter_map(|(field, field_schema)| {
                        let fallback = module_defaults.and_then(|d| d.get(field));
                        property_from_json_schema(field, field_schema, fallback, defs)
                    })
                    .collect();
                schema.modules.insert(name.clone(), list);
            } else if let Some(def) = property_from_json_schema(name, prop, None, defs) {
                schema.global.push(def);
            }
        }
        schema
    }

    fn from_flat_map(root: &Map<String, Value>) -> Result<Self, SchemaError> {
        let mut schema = Self::default();
        for (module, entries) in root {
            let entries: Vec<Value> =
                serde_json::from_value(entries.clone()).map_err(|source| {
                    SchemaError::Property {
                        module: module.clone(),
                        source,
                    }
                })?;
            let list = entries
                .into_iter()
                .filter_map(|entry| match serde_json::from_value::<RawProperty>(entry) {
                    Ok(raw) => Some(PropertyDef::from(raw)),
                    Err(e) => {
                        warn!("skipping property of `{module}`: {e}");
                        None
                    }
                })
                .collect();
            schema.modules.insert(module.clone(), list);
        }
        Ok(schema)
    }

    /// Definitions for a module, if the schema knows it.
    pub fn module(&self, name: &str) -> Option<&[PropertyDef]> {
        self.modules.get(name).map(Vec::as_slice)
    }

    /// Definitions of global keys.
    pub fn global(&self) -> &[PropertyDef] {
        &self.global
    }

    /// Module names in schema order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(alias = "property_name")]
    name: String,
    #[serde(rename = "type")]
    ty: PropertyType,
    #[serde(default)]
    minimum: Option<i64>,
    #[serde(default)]
    maximum: Option<i64>,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    items: Option<PropertyType>,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawProperty> for PropertyDef {
    fn from(raw: RawProperty) -> Self {
        Self {
            name: raw.name,
            ty: raw.ty,
            minimum: raw.minimum,
            maximum: raw.maximum,
            default: raw.default.as_ref().and_then(FieldValue::from_json),
            item_type: raw.items.unwrap_or(PropertyType::String),
            description: raw.description,
        }
    }
}

/// Follow `$ref` (directly or through a single-entry `allOf`).
fn resolve<'a>(schema: &'a Value, defs: Option<&'a Map<String, Value>>) -> Option<&'a Value> {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        let name = reference.rsplit('/').next()?;
        return defs?.get(name);
    }
    if let Some(Value::Array(all_of)) = schema.get("allOf")
        && let [single] = all_of.as_slice()
    {
        return resolve(single, defs);
    }
    Some(schema)
}

fn declared_type(schema: &Value) -> Option<PropertyType> {
    match schema.get("type")? {
        Value::String(name) => PropertyType::from_json_name(name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter(|n| *n != "null")
            .find_map(PropertyType::from_json_name),
        _ => None,
    }
}

fn bound(schema: &Value, key: &str) -> Option<i64> {
    schema.get(key).and_then(Value::as_f64).map(|f| f as i64)
}

fn property_from_json_schema(
    name: &str,
    schema: &Value,
    fallback_default: Option<&Value>,
    defs: Option<&Map<String, Value>>,
) -> Option<PropertyDef> {
    let resolved = resolve(schema, defs)?;
    let ty = declared_type(schema).or_else(|| declared_type(resolved))?;

    let item_type = match resolved.get("items").and_then(declared_type) {
        Some(PropertyType::Integer) => PropertyType::Integer,
        _ => PropertyType::String,
    };
    let default = schema
        .get("default")
        .or(fallback_default)
        .or_else(|| resolved.get("default"))
        .and_then(FieldValue::from_json);
    let description = schema
        .get("description")
        .or_else(|| resolved.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(PropertyDef {
        name: name.to_string(),
        ty,
        minimum: bound(schema, "minimum").or_else(|| bound(resolved, "minimum")),
        maximum: bound(schema, "maximum").or_else(|| bound(resolved, "maximum")),
        default,
        item_type,
        description,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn published_layout() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "$schema": { "type": "string" },
                "add_newline": { "default": true, "type": "boolean" },
                "scan_timeout": { "default": 30, "type": "integer", "format": "uint64", "minimum": 0.0 },
                "palettes": { "type": "object", "additionalProperties": true },
                "time": {
                    "default": { "disabled": true, "format": "at [$time]($style) " },
                    "allOf": [{ "$ref": "#/definitions/TimeConfig" }]
                },
                "git_branch": { "$ref": "#/definitions/GitBranchConfig" }
            },
            "definitions": {
                "TimeConfig": {
                    "type": "object",
                    "properties": {
                        "format": { "type": "string" },
                        "disabled": { "type": "boolean" },
                        "time_range": { "type": ["string", "null"] },
                        "utc_time_offset": { "type": "string", "default": "local" }
                    }
                },
                "GitBranchConfig": {
                    "type": "object",
                    "properties": {
                        "truncation_length": { "type": "integer", "minimum": 1.0, "maximum": 64.0 },
                        "ignore_branches": { "type": "array", "items": { "type": "string" }, "default": [] },
                        "style": { "$ref": "#/definitions/Style" }
                    }
                },
                "Style": { "type": "string", "default": "bold purple" }
            }
        })
    }

    #[test]
    fn test_json_schema_modules() {
        let schema = Schema::from_json(&published_layout()).unwrap();

        let time = schema.module("time").unwrap();
        let names: Vec<_> = time.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["format", "disabled", "time_range", "utc_time_offset"]);
        assert_eq!(time[1].default, Some(FieldValue::Boolean(true)));
        assert_eq!(time[2].ty, PropertyType::String);
        assert_eq!(time[3].default, Some(FieldValue::String("local".into())));

        let branch = schema.module("git_branch").unwrap();
        assert_eq!(branch[0].minimum, Some(1));
        assert_eq!(branch[0].maximum, Some(64));
        assert_eq!(branch[1].ty, PropertyType::Array);
        assert_eq!(branch[2].ty, PropertyType::String);
        assert_eq!(branch[2].default, Some(FieldValue::String("bold purple".into())));
    }

    #[test]
    fn test_json_schema_global() {
        let schema = Schema::from_json(&published_layout()).unwrap();
        let names: Vec<_> = schema.global().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["add_newline", "scan_timeout"]);
        assert_eq!(schema.global()[1].minimum, Some(0));
        assert!(schema.module("palettes").is_none());
    }

    #[test]
    fn test_flat_layout() {
        let schema = Schema::from_json(&json!({
            "battery": [
                { "name": "full_symbol", "type": "string" },
                { "property_name": "threshold", "type": "integer", "minimum": 0, "maximum": 100, "default": 10 }
            ]
        }))
        .unwrap();
        let battery = schema.module("battery").unwrap();
        assert_eq!(battery.len(), 2);
        assert_eq!(battery[1].maximum, Some(100));
        assert_eq!(battery[1].default, Some(FieldValue::Integer(10)));
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(Schema::from_json(&json!([1, 2])).is_err());
        assert!(Schema::from_json(&json!({ "time": { "a": 1 } })).is_err());
        assert!(matches!(
            Schema::from_json(&json!({ "time": "x" })),
            Err(SchemaError::Property { .. })
        ));
    }

    #[test]
    fn test_flat_layout_skips_unsupported_entries() {
        let schema = Schema::from_json(&json!({
            "time": [
                { "name": "format", "type": "string" },
                { "name": "x", "type": "object" },
                { "name": "disabled", "type": "boolean", "default": true }
            ],
            "battery": [{ "name": "full_symbol", "type": "string" }]
        }))
        .unwrap();
        let names: Vec<_> = schema
            .module("time")
            .unwrap()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["format", "disabled"]);
        assert_eq!(schema.module("battery").unwrap().len(), 1);
    }
}
