//! Singer catalog value objects produced by discovery.
//!
//! # Module Structure
//! - `schema`: JSON-Schema-like fragments and inclusion states
//! - `metadata`: breadcrumb metadata builder and Singer list form

pub mod metadata;
pub mod schema;

pub use metadata::{Breadcrumb, Metadata, MetadataEntry, property_breadcrumb, stream_breadcrumb};
pub use schema::{Inclusion, JsonType, Schema};

use serde::{Deserialize, Serialize};

/// Description of one discoverable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// `"{schema}-{table}"`
    pub tap_stream_id: String,
    #[serde(rename = "table_name")]
    pub table: String,
    pub stream: String,
    #[serde(rename = "database_name")]
    pub database: String,
    pub schema: Schema,
    pub metadata: Vec<MetadataEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_properties: Option<Vec<String>>,
    pub is_view: bool,
}

impl CatalogEntry {
    /// Looks up a metadata value of this entry.
    pub fn metadata_value(&self, breadcrumb: &[String], key: &str) -> Option<&serde_json::Value> {
        self.metadata
            .iter()
            .find(|entry| entry.breadcrumb == breadcrumb)
            .and_then(|entry| entry.metadata.get(key))
    }
}

/// Ordered list of catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Wraps a list of entries.
    pub fn new(streams: Vec<CatalogEntry>) -> Self {
        Self { streams }
    }

    /// Finds an entry by its tap stream id.
    pub fn get_stream(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams
            .iter()
            .find(|entry| entry.tap_stream_id == tap_stream_id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// True when discovery found nothing.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::TapDb2Error::Serialization {
            context: "Failed to serialize catalog".to_string(),
            source: e,
        })
    }
}
