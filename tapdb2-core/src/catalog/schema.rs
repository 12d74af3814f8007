//! JSON-Schema-like fragments describing tables and columns.

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::Number;

/// Whether a column or table can be selected for replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inclusion {
    /// Always replicated, cannot be deselected (primary key columns)
    Automatic,
    /// Selectable
    Available,
    /// Cannot be represented
    Unsupported,
}

impl Inclusion {
    /// Wire name of the inclusion state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Available => "available",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for Inclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` keyword: a single type or a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonType {
    Single(String),
    Union(Vec<String>),
}

impl JsonType {
    /// `["null", <type>]`
    pub fn nullable(type_name: &str) -> Self {
        Self::Union(vec!["null".to_string(), type_name.to_string()])
    }

    /// `"object"`
    pub fn object() -> Self {
        Self::Single("object".to_string())
    }

    /// Whether `type_name` is one of the admitted types.
    pub fn includes(&self, type_name: &str) -> bool {
        match self {
            Self::Single(single) => single == type_name,
            Self::Union(types) => types.iter().any(|t| t == type_name),
        }
    }
}

/// A schema fragment. Absent fields are omitted when serialized.
///
/// Bounds follow the draft-04 convention: `exclusiveMinimum` and
/// `exclusiveMaximum` are booleans qualifying `minimum` and `maximum`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub json_type: Option<JsonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Inclusion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Schema {
    /// Fragment with only an inclusion state set.
    pub fn with_inclusion(inclusion: Inclusion) -> Self {
        Self {
            inclusion: Some(inclusion),
            ..Self::default()
        }
    }

    /// Table-level schema: `{"type": "object", "properties": {...}}`.
    ///
    /// Properties serialize in insertion order.
    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        Self {
            json_type: Some(JsonType::object()),
            properties: Some(properties),
            ..Self::default()
        }
    }

    /// Looks up a column fragment of an object schema.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|props| props.get(name))
    }

    /// Inclusion state, `available` when unset.
    pub fn effective_inclusion(&self) -> Inclusion {
        self.inclusion.unwrap_or(Inclusion::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_fields_are_omitted() {
        let schema = Schema {
            json_type: Some(JsonType::nullable("string")),
            inclusion: Some(Inclusion::Available),
            ..Schema::default()
        };
        let value = serde_json::to_value(&schema).expect("serialize");
        assert_eq!(
            value,
            json!({"type": ["null", "string"], "inclusion": "available"})
        );
    }

    #[test]
    fn test_camel_case_keywords() {
        let schema = Schema {
            exclusive_maximum: Some(true),
            maximum: Some(Number::from(100)),
            multiple_of: Number::from_f64(0.5),
            max_length: Some(8),
            ..Schema::default()
        };
        let value = serde_json::to_value(&schema).expect("serialize");
        assert_eq!(value["exclusiveMaximum"], true);
        assert_eq!(value["multipleOf"], 0.5);
        assert_eq!(value["maxLength"], 8);
        assert_eq!(value["maximum"], 100);
    }

    #[test]
    fn test_object_schema() {
        let mut props = IndexMap::new();
        props.insert("ID".to_string(), Schema::with_inclusion(Inclusion::Automatic));
        let schema = Schema::object(props);

        assert!(schema.json_type.as_ref().is_some_and(|t| t.includes("object")));
        assert_eq!(
            schema.property("ID").map(Schema::effective_inclusion),
            Some(Inclusion::Automatic)
        );
        assert!(schema.property("MISSING").is_none());
    }

    #[test]
    fn test_json_type_includes() {
        let t = JsonType::nullable("integer");
        assert!(t.includes("null"));
        assert!(t.includes("integer"));
        assert!(!t.includes("string"));
    }

    #[test]
    fn test_deserialize_single_and_union_type() {
        let schema: Schema =
            serde_json::from_value(json!({"type": "object", "properties": {}})).expect("object");
        assert_eq!(schema.json_type, Some(JsonType::object()));

        let schema: Schema =
            serde_json::from_value(json!({"type": ["null", "number"]})).expect("union");
        assert_eq!(schema.json_type, Some(JsonType::nullable("number")));
    }
}
