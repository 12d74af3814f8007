//! Raw catalog rows stored in a JSON file.
//!
//! A snapshot is captured once from a live system and can then be
//! rediscovered offline any number of times; discovery over a snapshot yields
//! the same catalog as discovery over the system it was captured from.

use super::{CatalogQuery, RowStream};
use crate::Result;
use crate::error::TapDb2Error;
use crate::models::{Column, PrimaryKeyColumn, Table};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot file format versions this build reads.
pub const SUPPORTED_SNAPSHOT_VERSIONS: &[&str] = &["1.0"];

/// In-memory copy of the three raw catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub format_version: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_keys: Vec<PrimaryKeyColumn>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}

impl CatalogSnapshot {
    /// Builds a snapshot from raw rows.
    pub fn new(
        tables: Vec<Table>,
        columns: Vec<Column>,
        primary_keys: Vec<PrimaryKeyColumn>,
    ) -> Self {
        Self {
            format_version: "1.0".to_string(),
            tables,
            columns,
            primary_keys,
        }
    }

    /// Reads every row of the three catalogs of `source`.
    ///
    /// Rows are stored as returned: no filtering happens here, so orphan
    /// columns are dropped later by discovery exactly as on the live system.
    pub async fn capture(source: &dyn CatalogQuery) -> Result<Self> {
        tracing::info!("Capturing catalog snapshot from {}", source.describe());
        let tables: Vec<Table> = source.query_tables().await?.try_collect().await?;
        let columns: Vec<Column> = source.query_columns().await?.try_collect().await?;
        let primary_keys: Vec<PrimaryKeyColumn> =
            source.query_primary_keys().await?.try_collect().await?;
        tracing::info!(
            "Captured {} tables, {} columns, {} primary key columns",
            tables.len(),
            columns.len(),
            primary_keys.len()
        );
        Ok(Self::new(tables, columns, primary_keys))
    }

    /// Parses a snapshot document and checks its format version.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| TapDb2Error::Serialization {
                context: "Failed to parse catalog snapshot".to_string(),
                source: e,
            })?;

        if !SUPPORTED_SNAPSHOT_VERSIONS.contains(&snapshot.format_version.as_str()) {
            return Err(TapDb2Error::configuration(format!(
                "Unsupported snapshot format version '{}'. Supported versions: {:?}",
                snapshot.format_version, SUPPORTED_SNAPSHOT_VERSIONS
            )));
        }

        Ok(snapshot)
    }

    /// Loads a snapshot file.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TapDb2Error::Io {
                context: format!("Failed to read snapshot {}", path.display()),
                source: e,
            })?;
        Self::from_json_str(&json)
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| TapDb2Error::Serialization {
            context: "Failed to serialize catalog snapshot".to_string(),
            source: e,
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| TapDb2Error::Io {
                context: format!("Failed to write snapshot {}", path.display()),
                source: e,
            })
    }
}

#[async_trait]
impl CatalogQuery for CatalogSnapshot {
    async fn query_tables<'a>(&'a self) -> Result<RowStream<'a, Table>> {
        Ok(stream::iter(self.tables.iter().cloned().map(Ok)).boxed())
    }

    async fn query_columns<'a>(&'a self) -> Result<RowStream<'a, Column>> {
        Ok(stream::iter(self.columns.iter().cloned().map(Ok)).boxed())
    }

    async fn query_primary_keys<'a>(&'a self) -> Result<RowStream<'a, PrimaryKeyColumn>> {
        Ok(stream::iter(self.primary_keys.iter().cloned().map(Ok)).boxed())
    }

    fn describe(&self) -> String {
        format!(
            "catalog snapshot ({} tables, {} columns)",
            self.tables.len(),
            self.columns.len()
        )
    }
}
