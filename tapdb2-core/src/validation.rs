//! JSON Schema validation of the discovered catalog.
//!
//! The catalog is checked against an embedded JSON Schema before it is
//! written, then scanned for anything that looks like a leaked credential.
//!
//! # Security Guarantees
//! - Connection URLs with inline credentials are rejected
//! - ODBC `PWD=` / `password=` fragments are rejected
//!
//! Column names are data, not field names: a column called `AUTHOR` or
//! `PASSWORD_HASH` is legal, only string values are scanned.
//!
//! # Example
//! ```rust
//! use tapdb2_core::validation::{initialize_schema_validator, validate_catalog_output};
//! use serde_json::json;
//!
//! initialize_schema_validator()?;
//! validate_catalog_output(&json!({"streams": []}))?;
//! # Ok::<(), tapdb2_core::validation::ValidationError>(())
//! ```

use crate::catalog::Catalog;
use jsonschema::Validator;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// Catalog validation errors with field-level reporting.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema compilation failed during initialization
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// Validation failed with specific field errors
    #[error("Catalog validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// Potential credential exposure
    #[error("Security validation failed: {reason}")]
    SecurityViolation { reason: String },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Embedded JSON Schema of the Singer catalog.
const CATALOG_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "tapdb2 Singer catalog",
  "type": "object",
  "required": ["streams"],
  "additionalProperties": false,
  "properties": {
    "streams": { "type": "array", "items": { "$ref": "#/$defs/stream" } }
  },
  "$defs": {
    "inclusion": { "enum": ["automatic", "available", "unsupported"] },
    "stream": {
      "type": "object",
      "required": [
        "tap_stream_id", "table_name", "stream", "database_name",
        "schema", "metadata", "is_view"
      ],
      "additionalProperties": false,
      "properties": {
        "tap_stream_id": { "type": "string", "minLength": 3 },
        "table_name": { "type": "string", "minLength": 1 },
        "stream": { "type": "string", "minLength": 1 },
        "database_name": { "type": "string", "minLength": 1 },
        "schema": { "$ref": "#/$defs/table_schema" },
        "metadata": { "type": "array", "items": { "$ref": "#/$defs/metadata" } },
        "key_properties": {
          "type": "array",
          "items": { "type": "string" },
          "minItems": 1
        },
        "is_view": { "type": "boolean" }
      }
    },
    "table_schema": {
      "type": "object",
      "required": ["type", "properties"],
      "additionalProperties": false,
      "properties": {
        "type": { "const": "object" },
        "properties": {
          "type": "object",
          "additionalProperties": { "$ref": "#/$defs/fragment" }
        },
        "inclusion": { "$ref": "#/$defs/inclusion" },
        "description": { "type": "string" }
      }
    },
    "fragment": {
      "type": "object",
      "required": ["inclusion"],
      "additionalProperties": false,
      "properties": {
        "type": {
          "type": "array",
          "items": { "enum": ["null", "integer", "number", "string"] }
        },
        "inclusion": { "$ref": "#/$defs/inclusion" },
        "description": { "type": "string" },
        "minimum": { "type": "number" },
        "maximum": { "type": "number" },
        "exclusiveMinimum": { "type": "boolean" },
        "exclusiveMaximum": { "type": "boolean" },
        "multipleOf": { "type": "number", "exclusiveMinimum": 0 },
        "maxLength": { "type": "integer", "minimum": 1 },
        "format": { "const": "date-time" }
      }
    },
    "metadata": {
      "type": "object",
      "required": ["breadcrumb", "metadata"],
      "additionalProperties": false,
      "properties": {
        "breadcrumb": { "type": "array", "items": { "type": "string" }, "maxItems": 2 },
        "metadata": { "type": "object" }
      }
    }
  }
}"##;

/// Inline-credential URL, e.g. `db2://user:pw@host`.
const CONNECTION_URL_PATTERN: &str = r"(?i)\b(db2|ibmi|as400|jdbc:as400)://[^\s/@]*:[^\s@]*@";

/// Compiled validators (initialized once)
struct Validators {
    schema: Validator,
    connection_url: Regex,
}

static VALIDATORS: OnceLock<Validators> = OnceLock::new();

/// Compiles the embedded catalog schema and caches it for reuse.
///
/// Calling it again after a successful initialization is a no-op.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if the embedded schema is invalid.
pub fn initialize_schema_validator() -> Result<(), ValidationError> {
    if VALIDATORS.get().is_some() {
        return Ok(());
    }

    let schema_json = get_schema_definition()?;
    let schema =
        jsonschema::validator_for(&schema_json).map_err(|e| ValidationError::SchemaCompilation {
            message: format!("Schema compilation error: {}", e),
        })?;
    let connection_url =
        Regex::new(CONNECTION_URL_PATTERN).map_err(|e| ValidationError::SchemaCompilation {
            message: format!("Connection pattern compilation error: {}", e),
        })?;

    // Another thread may have won the race; either value is equivalent
    let _ = VALIDATORS.set(Validators {
        schema,
        connection_url,
    });

    Ok(())
}

fn validators() -> Result<&'static Validators, ValidationError> {
    VALIDATORS
        .get()
        .ok_or_else(|| ValidationError::SchemaCompilation {
            message: "Schema validator not initialized. Call initialize_schema_validator() first."
                .to_string(),
        })
}

/// Validates the JSON form of a catalog.
///
/// Every schema violation is reported, followed by the security scan.
///
/// # Errors
/// Returns `ValidationFailed` listing schema violations, or
/// `SecurityViolation` if a credential pattern is found.
pub fn validate_catalog_output(json_value: &Value) -> Result<(), ValidationError> {
    let validators = validators()?;

    let errors: Vec<String> = validators
        .schema
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ValidationError::ValidationFailed {
            error_count: errors.len(),
            errors,
        });
    }

    validate_no_credentials_recursive(json_value, "", &validators.connection_url)
}

/// Serializes and validates a catalog.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let json_value = serde_json::to_value(catalog)?;
    validate_catalog_output(&json_value)
}

/// Parses, validates and deserializes a catalog document.
///
/// # Errors
/// Returns validation errors for malformed JSON, schema violations, or
/// security issues.
pub fn validate_and_parse_catalog(json_str: &str) -> Result<Catalog, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;
    validate_catalog_output(&json_value)?;
    Ok(serde_json::from_value(json_value)?)
}

/// Recursively checks string values for credential patterns.
fn validate_no_credentials_recursive(
    value: &Value,
    path: &str,
    connection_url: &Regex,
) -> Result<(), ValidationError> {
    match value {
        Value::String(s) => {
            let lower_s = s.to_lowercase();
            if lower_s.contains("password=") || lower_s.contains("pwd=") {
                return Err(ValidationError::SecurityViolation {
                    reason: format!(
                        "Potential password found at path '{}': contains password pattern",
                        path
                    ),
                });
            }
            if connection_url.is_match(s) {
                return Err(ValidationError::SecurityViolation {
                    reason: format!(
                        "Connection string with credentials found at path '{}'",
                        path
                    ),
                });
            }
        }
        Value::Object(obj) => {
            for (key, val) in obj {
                let new_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                validate_no_credentials_recursive(val, &new_path, connection_url)?;
            }
        }
        Value::Array(arr) => {
            for (index, item) in arr.iter().enumerate() {
                let new_path = format!("{}[{}]", path, index);
                validate_no_credentials_recursive(item, &new_path, connection_url)?;
            }
        }
        _ => {}
    }

    Ok(())
}

/// The embedded catalog JSON Schema, for tools that work with it directly.
pub fn get_schema_definition() -> Result<Value, ValidationError> {
    serde_json::from_str(CATALOG_SCHEMA).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}
