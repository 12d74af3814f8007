//! DB2 for i column types to JSON-Schema fragments.
//!
//! Type names are matched case-insensitively. See the IBM i SQL reference
//! chapters on numeric, character string and datetime data types.

use crate::catalog::{Inclusion, JsonType, Schema};
use crate::models::Column;
use indexmap::IndexMap;
use serde_json::Number;

/// Native type families understood by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    /// smallint, integer, bigint
    Integer { bytes: u32 },
    /// float, decfloat
    Float,
    /// decimal, numeric
    Decimal,
    /// char, varchar
    String,
    /// date, timestmp, time
    DateTime,
    Unsupported,
}

impl TypeFamily {
    /// Classifies a native type name.
    pub fn classify(native_type: &str) -> Self {
        match native_type.trim().to_lowercase().as_str() {
            "smallint" => Self::Integer { bytes: 2 },
            "integer" => Self::Integer { bytes: 4 },
            "bigint" => Self::Integer { bytes: 8 },
            "float" | "decfloat" => Self::Float,
            "decimal" | "numeric" => Self::Decimal,
            "char" | "varchar" => Self::String,
            "date" | "timestmp" | "time" => Self::DateTime,
            _ => Self::Unsupported,
        }
    }
}

/// Maps one column to its schema fragment.
///
/// Primary key membership is matched case-insensitively on the column name
/// and makes the column `automatic`. Unsupported types discard it: the
/// fragment then carries only `inclusion` and `description`.
pub fn map_column(column: &Column, primary_key_columns: &[String]) -> Schema {
    let native_type = column.native_type();
    let is_key = primary_key_columns
        .iter()
        .any(|key| key.eq_ignore_ascii_case(&column.column_name));
    let inclusion = if is_key {
        Inclusion::Automatic
    } else {
        Inclusion::Available
    };

    let mut schema = Schema::with_inclusion(inclusion);
    match TypeFamily::classify(&native_type) {
        TypeFamily::Integer { bytes } => {
            let (minimum, maximum) = integer_bounds(bytes);
            schema.json_type = Some(JsonType::nullable("integer"));
            schema.minimum = Some(Number::from(minimum));
            schema.maximum = Some(Number::from(maximum));
        }
        TypeFamily::Float => {
            schema.json_type = Some(JsonType::nullable("number"));
        }
        TypeFamily::Decimal => {
            let precision = column.numeric_precision.unwrap_or(0);
            let scale = column.numeric_scale.unwrap_or(0);
            if scale == 0 {
                schema.json_type = Some(JsonType::nullable("integer"));
            } else {
                schema.json_type = Some(JsonType::nullable("number"));
                schema.multiple_of = power_of_ten(0i32.saturating_sub(scale), false);
            }
            let exponent = precision.saturating_sub(scale);
            schema.exclusive_maximum = Some(true);
            schema.maximum = power_of_ten(exponent, false);
            schema.exclusive_minimum = Some(true);
            schema.minimum = power_of_ten(exponent, true);
        }
        TypeFamily::String => {
            schema.json_type = Some(JsonType::nullable("string"));
            schema.max_length = column.character_maximum_length.filter(|len| *len > 0);
        }
        TypeFamily::DateTime => {
            schema.json_type = Some(JsonType::nullable("string"));
            schema.format = Some("date-time".to_string());
        }
        TypeFamily::Unsupported => {
            schema = Schema {
                inclusion: Some(Inclusion::Unsupported),
                description: Some(format!("Unsupported data type {}", native_type)),
                ..Schema::default()
            };
        }
    }
    schema
}

/// Builds the table-level object schema from its columns.
///
/// Properties are keyed by column name in catalog order; a repeated name
/// keeps its first position and the last column's fragment.
pub fn generate_schema(columns: &[Column], primary_key_columns: &[String]) -> Schema {
    let properties: IndexMap<String, Schema> = columns
        .iter()
        .map(|column| {
            (
                column.column_name.clone(),
                map_column(column, primary_key_columns),
            )
        })
        .collect();
    Schema::object(properties)
}

/// Signed range of a two's complement integer of `bytes` bytes.
fn integer_bounds(bytes: u32) -> (i64, i64) {
    let bits = (bytes * 8).clamp(1, 64);
    let maximum = i64::MAX >> (64 - bits);
    (-maximum - 1, maximum)
}

/// `10^exponent` (negated when `negative`) as a JSON number.
///
/// Exact integers while the value fits in `i64`, otherwise the nearest
/// `f64`. Returns `None` only when the value overflows `f64`.
fn power_of_ten(exponent: i32, negative: bool) -> Option<Number> {
    if let Ok(exp) = u32::try_from(exponent)
        && let Some(value) = 10i64.checked_pow(exp)
    {
        return Some(Number::from(if negative { -value } else { value }));
    }
    let value: f64 = format!("1e{}", exponent).parse().ok()?;
    Number::from_f64(if negative { -value } else { value })
}
