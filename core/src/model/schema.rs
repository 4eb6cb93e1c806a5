//! Parameter schema translation
//!
//! Tool providers declare parameters in a JSON-Schema-like dialect with
//! lowercase primitive type names. The model endpoint expects its own
//! enumerated types, so every declaration is translated into a typed
//! schema tree at registry-build time.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the synthetic property injected into empty object schemas.
///
/// Providers use `type: object` even for tools that take no arguments,
/// but the model endpoint rejects object schemas with zero properties.
pub const UNUSED_PROPERTY: &str = "unused";

/// Parameter types understood by the model endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterType {
    Object,
    String,
    Number,
    Boolean,
    Array,
    Integer,
}

impl ParameterType {
    /// Map a provider-dialect type name to the endpoint's enumerated type.
    /// Any name outside the enumerated set is a fatal configuration error.
    pub fn from_provider(name: &str) -> Result<Self, SchemaError> {
        match name {
            "object" => Ok(ParameterType::Object),
            "string" => Ok(ParameterType::String),
            "number" => Ok(ParameterType::Number),
            "boolean" => Ok(ParameterType::Boolean),
            "array" => Ok(ParameterType::Array),
            "integer" => Ok(ParameterType::Integer),
            other => Err(SchemaError::UnsupportedType {
                type_name: other.to_string(),
            }),
        }
    }
}

/// A typed, recursive parameter schema in the model endpoint's dialect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// The parameter type
    #[serde(rename = "type")]
    pub param_type: ParameterType,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the parameter may be null/omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Allowed values for string parameters
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// Nested properties for object parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ParameterSchema>,

    /// Element schema for array parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,

    /// Names of required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ParameterSchema {
    /// A bare schema of the given type
    pub fn of_type(param_type: ParameterType) -> Self {
        Self {
            param_type,
            description: None,
            nullable: None,
            enum_values: None,
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
        }
    }

    /// An object schema with the given properties and required names
    pub fn object(
        properties: BTreeMap<String, ParameterSchema>,
        required: Vec<String>,
    ) -> Self {
        Self {
            properties,
            required,
            ..Self::of_type(ParameterType::Object)
        }
    }

    /// Translate a provider-dialect schema tree into the endpoint dialect.
    ///
    /// Structure is preserved: properties, items, nesting, required lists
    /// and descriptions pass through unchanged. Only type names change.
    pub fn translate(schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let obj = schema.as_object().ok_or_else(|| SchemaError::Malformed {
            message: format!("schema is not an object: {schema}"),
        })?;

        let type_name = obj
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| SchemaError::Malformed {
                message: "schema has no string 'type' field".to_string(),
            })?;

        let mut translated = Self::of_type(ParameterType::from_provider(type_name)?);

        translated.description = obj
            .get("description")
            .and_then(|d| d.as_str())
            .map(str::to_string);

        translated.nullable = obj.get("nullable").and_then(|n| n.as_bool());

        if let Some(values) = obj.get("enum").and_then(|e| e.as_array()) {
            translated.enum_values = Some(
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            );
        }

        if let Some(properties) = obj.get("properties") {
            let map = properties
                .as_object()
                .ok_or_else(|| SchemaError::Malformed {
                    message: "'properties' is not an object".to_string(),
                })?;
            for (name, prop) in map {
                translated
                    .properties
                    .insert(name.clone(), Self::translate(prop)?);
            }
        }

        if let Some(items) = obj.get("items") {
            translated.items = Some(Box::new(Self::translate(items)?));
        }

        if let Some(required) = obj.get("required").and_then(|r| r.as_array()) {
            translated.required = required
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }

        Ok(translated)
    }

    /// Translate a tool's root parameter schema.
    ///
    /// Applies the empty-object workaround: an object-typed root with no
    /// properties gets one optional nullable integer property injected,
    /// because the endpoint rejects empty-object parameter schemas.
    pub fn translate_root(schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let mut translated = Self::translate(schema)?;

        if translated.param_type == ParameterType::Object && translated.properties.is_empty() {
            let mut unused = Self::of_type(ParameterType::Integer);
            unused.nullable = Some(true);
            translated
                .properties
                .insert(UNUSED_PROPERTY.to_string(), unused);
        }

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translates_primitive_type_names() {
        let schema = json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File path"},
                "limit": {"type": "integer"},
                "ratio": {"type": "number"},
                "flags": {"type": "array", "items": {"type": "boolean"}}
            },
            "required": ["path"]
        });

        let translated = ParameterSchema::translate_root(&schema).unwrap();
        assert_eq!(translated.param_type, ParameterType::Object);
        assert_eq!(translated.properties.len(), 4);
        assert_eq!(
            translated.properties["path"].param_type,
            ParameterType::String
        );
        assert_eq!(
            translated.properties["path"].description.as_deref(),
            Some("File path")
        );
        assert_eq!(
            translated.properties["limit"].param_type,
            ParameterType::Integer
        );
        assert_eq!(
            translated.properties["flags"].param_type,
            ParameterType::Array
        );
        assert_eq!(
            translated.properties["flags"]
                .items
                .as_ref()
                .unwrap()
                .param_type,
            ParameterType::Boolean
        );
        assert_eq!(translated.required, vec!["path".to_string()]);
    }

    #[test]
    fn serializes_types_in_endpoint_dialect() {
        let schema = ParameterSchema::of_type(ParameterType::String);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value, json!({"type": "STRING"}));
    }

    #[test]
    fn empty_object_gets_unused_property() {
        let schema = json!({"type": "object", "properties": {}});
        let translated = ParameterSchema::translate_root(&schema).unwrap();

        assert_eq!(translated.properties.len(), 1);
        let unused = &translated.properties[UNUSED_PROPERTY];
        assert_eq!(unused.param_type, ParameterType::Integer);
        assert_eq!(unused.nullable, Some(true));
    }

    #[test]
    fn object_without_properties_key_gets_unused_property() {
        let schema = json!({"type": "object"});
        let translated = ParameterSchema::translate_root(&schema).unwrap();
        assert!(translated.properties.contains_key(UNUSED_PROPERTY));
    }

    #[test]
    fn populated_object_is_unchanged_in_property_count() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}}
        });
        let translated = ParameterSchema::translate_root(&schema).unwrap();
        assert_eq!(translated.properties.len(), 1);
        assert!(!translated.properties.contains_key(UNUSED_PROPERTY));
    }

    #[test]
    fn nested_empty_objects_are_left_alone() {
        // The workaround applies only at the root.
        let schema = json!({
            "type": "object",
            "properties": {
                "inner": {"type": "object", "properties": {}}
            }
        });
        let translated = ParameterSchema::translate_root(&schema).unwrap();
        assert!(translated.properties["inner"].properties.is_empty());
    }

    #[test]
    fn unknown_type_name_is_fatal() {
        let schema = json!({"type": "tuple"});
        match ParameterSchema::translate_root(&schema) {
            Err(SchemaError::UnsupportedType { type_name }) => assert_eq!(type_name, "tuple"),
            other => panic!("Expected UnsupportedType, got: {other:?}"),
        }
    }

    #[test]
    fn missing_type_is_malformed() {
        let schema = json!({"properties": {}});
        assert!(matches!(
            ParameterSchema::translate_root(&schema),
            Err(SchemaError::Malformed { .. })
        ));
    }
}
