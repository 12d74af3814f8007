//! Typed field extraction from text result rows.

use super::RawRow;
use crate::{Result, error::TapDb2Error};
use std::str::FromStr;

/// Extension trait for extracting typed values from catalog rows with
/// consistent error context.
///
/// # Example
/// ```rust
/// use tapdb2_core::source::RawRow;
/// use tapdb2_core::source::helpers::RowExt;
///
/// let row: RawRow = [Some("SALES"), None, Some("12")].into_iter().collect();
/// let schema = row.required_text(0, "table_schema", "qsys2.systables")?;
/// let length: Option<i64> = row.optional_number(1, "character_maximum_length", "qsys2.syscolumns")?;
/// let scale: Option<i32> = row.optional_number(2, "numeric_scale", "qsys2.syscolumns")?;
/// assert_eq!(schema, "SALES");
/// assert_eq!(length, None);
/// assert_eq!(scale, Some(12));
/// # Ok::<(), tapdb2_core::TapDb2Error>(())
/// ```
pub trait RowExt {
    /// Extracts a non-NULL text field.
    fn required_text(&self, index: usize, field_name: &str, catalog: &str) -> Result<String>;

    /// Extracts a nullable numeric field.
    fn optional_number<T>(&self, index: usize, field_name: &str, catalog: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static;

    /// Extracts a non-NULL numeric field.
    fn required_number<T>(&self, index: usize, field_name: &str, catalog: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.optional_number(index, field_name, catalog)?
            .ok_or_else(|| TapDb2Error::missing_field(field_name, catalog))
    }
}

impl RowExt for RawRow {
    fn required_text(&self, index: usize, field_name: &str, catalog: &str) -> Result<String> {
        self.get(index)
            .map(str::to_string)
            .ok_or_else(|| TapDb2Error::missing_field(field_name, catalog))
    }

    fn optional_number<T>(&self, index: usize, field_name: &str, catalog: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(index)
            .map(|text| {
                text.trim()
                    .parse::<T>()
                    .map_err(|e| TapDb2Error::parse_field(field_name, Some(catalog), e))
            })
            .transpose()
    }
}
