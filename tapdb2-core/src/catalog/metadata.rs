//! Singer stream metadata.
//!
//! Metadata is a set of `(breadcrumb, key, value)` triples. A breadcrumb is
//! `[]` for the stream itself and `["properties", <column>]` for a column.
//! [`Metadata`] accumulates triples in one owned builder and renders them as
//! the Singer list form, one [`MetadataEntry`] per breadcrumb in first-write
//! order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path of a metadata entry.
pub type Breadcrumb = Vec<String>;

/// Breadcrumb of the stream itself.
pub fn stream_breadcrumb() -> Breadcrumb {
    Vec::new()
}

/// Breadcrumb of a column.
pub fn property_breadcrumb(column: &str) -> Breadcrumb {
    vec!["properties".to_string(), column.to_string()]
}

/// One element of the Singer metadata list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Breadcrumb,
    pub metadata: Map<String, Value>,
}

/// Owned metadata builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value` at `breadcrumb`, replacing an earlier value.
    pub fn write(mut self, breadcrumb: &[String], key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.breadcrumb == breadcrumb)
        {
            Some(entry) => {
                entry.metadata.insert(key.to_string(), value);
            }
            None => {
                let mut metadata = Map::new();
                metadata.insert(key.to_string(), value);
                self.entries.push(MetadataEntry {
                    breadcrumb: breadcrumb.to_vec(),
                    metadata,
                });
            }
        }
        self
    }

    /// Reads back a single value.
    pub fn get(&self, breadcrumb: &[String], key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.breadcrumb == breadcrumb)
            .and_then(|entry| entry.metadata.get(key))
    }

    /// Flattened `(breadcrumb, key, value)` view.
    pub fn triples(&self) -> impl Iterator<Item = (&Breadcrumb, &str, &Value)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .metadata
                .iter()
                .map(move |(key, value)| (&entry.breadcrumb, key.as_str(), value))
        })
    }

    /// Singer list form.
    pub fn to_list(self) -> Vec<MetadataEntry> {
        self.entries
    }

    /// Rebuilds a builder from a Singer list.
    pub fn from_list(entries: Vec<MetadataEntry>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_groups_by_breadcrumb() {
        let metadata = Metadata::new()
            .write(&stream_breadcrumb(), "selected-by-default", false)
            .write(&property_breadcrumb("ID"), "selected-by-default", true)
            .write(&property_breadcrumb("ID"), "sql-datatype", "smallint");

        let list = metadata.to_list();
        assert_eq!(list.len(), 2);
        assert!(list[0].breadcrumb.is_empty());
        assert_eq!(list[1].breadcrumb, vec!["properties", "ID"]);
        assert_eq!(list[1].metadata.len(), 2);
    }

    #[test]
    fn test_write_replaces_value() {
        let metadata = Metadata::new()
            .write(&stream_breadcrumb(), "is-view", false)
            .write(&stream_breadcrumb(), "is-view", true);

        assert_eq!(metadata.get(&stream_breadcrumb(), "is-view"), Some(&json!(true)));
        assert_eq!(metadata.triples().count(), 1);
    }

    #[test]
    fn test_triples_follow_write_order() {
        let metadata = Metadata::new()
            .write(&property_breadcrumb("B"), "sql-datatype", "char")
            .write(&property_breadcrumb("A"), "sql-datatype", "date");

        let columns: Vec<&str> = metadata
            .triples()
            .map(|(breadcrumb, _, _)| breadcrumb[1].as_str())
            .collect();
        assert_eq!(columns, vec!["B", "A"]);
    }

    #[test]
    fn test_singer_list_shape() {
        let list = Metadata::new()
            .write(&stream_breadcrumb(), "selected-by-default", false)
            .to_list();
        let value = serde_json::to_value(&list).expect("serialize");
        assert_eq!(
            value,
            json!([{"breadcrumb": [], "metadata": {"selected-by-default": false}}])
        );
    }
}
