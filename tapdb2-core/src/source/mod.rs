//! Catalog query layer: where raw catalog rows come from.
//!
//! Discovery reads three catalogs (tables, columns, primary keys) through the
//! [`CatalogQuery`] trait. Each call runs exactly one query and hands back a
//! single-pass stream; the resources behind the stream are released when it
//! is exhausted or dropped.
//!
//! # Module Structure
//! - `config`: connection settings and the JSON config file
//! - `helpers`: typed field extraction from text rows
//! - `db2`: the fixed `qsys2` catalog queries over a [`Connector`]
//! - `snapshot`: raw catalog rows stored in a JSON file
//! - `odbc`: ODBC connector (feature `odbc`)

use crate::Result;
use crate::models::{Column, PrimaryKeyColumn, Table};
use crate::security::Credentials;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

pub mod config;
pub mod db2;
pub mod helpers;
pub mod snapshot;

#[cfg(feature = "odbc")]
pub mod odbc;


pub use config::{ConnectionConfig, TapConfig};
pub use db2::Db2Catalog;
pub use snapshot::CatalogSnapshot;

/// Finite, single-pass stream of catalog records.
pub type RowStream<'a, T> = BoxStream<'a, Result<T>>;

/// One result row as returned by the driver: text values, `None` for NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    values: Vec<Option<String>>,
}

impl RawRow {
    /// Wraps the column values of one row.
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Value at `index`; `None` for NULL or a missing column.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a row without columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for RawRow {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|v| v.map(Into::into)).collect())
    }
}

/// Executes SQL against the source system.
///
/// Each call acquires its own connection; the connection lives as long as
/// the returned stream and is closed once the stream ends or is dropped.
/// Errors are surfaced either from the call itself or as a stream item; no
/// retry is attempted.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Runs one statement and streams its rows.
    async fn query(&self, sql: &str) -> Result<RowStream<'static, RawRow>>;

    /// Short, credential-free description for logs.
    fn describe(&self) -> String;

    /// Opens a connection and runs a trivial query.
    async fn test_connection(&self) -> Result<()> {
        let rows: Vec<RawRow> = self
            .query("SELECT 1 FROM sysibm.sysdummy1")
            .await?
            .try_collect()
            .await?;
        if rows.len() != 1 {
            return Err(crate::error::TapDb2Error::query_failed(format!(
                "Connectivity check returned {} rows, expected 1",
                rows.len()
            )));
        }
        Ok(())
    }
}

/// Source of the three raw catalogs used by discovery.
///
/// # Object Safety
/// This trait is object-safe; discovery takes `&dyn CatalogQuery`.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Tables catalog: `(table_schema, table_name, table_type)`.
    async fn query_tables<'a>(&'a self) -> Result<RowStream<'a, Table>>;

    /// Columns catalog.
    async fn query_columns<'a>(&'a self) -> Result<RowStream<'a, Column>>;

    /// Primary key catalog: one row per key column with its ordinal position.
    async fn query_primary_keys<'a>(&'a self) -> Result<RowStream<'a, PrimaryKeyColumn>>;

    /// Short, credential-free description for logs.
    fn describe(&self) -> String;
}

/// Creates the live connector for a configuration.
///
/// # Errors
/// Returns an error if the configuration is invalid or the ODBC connector was
/// not compiled in.
pub fn create_connector(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<Box<dyn Connector>> {
    config.validate()?;

    #[cfg(feature = "odbc")]
    {
        let connector = odbc::OdbcConnector::new(config, credentials);
        Ok(Box::new(connector))
    }
    #[cfg(not(feature = "odbc"))]
    {
        let _ = credentials;
        Err(crate::error::TapDb2Error::unsupported_feature(
            "ODBC connector",
            "Compile with --features odbc to enable live DB2 access",
        ))
    }
}

/// Creates a catalog source reading the live `qsys2` catalogs.
///
/// # Errors
/// Same conditions as [`create_connector`].
pub fn create_catalog(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<Box<dyn CatalogQuery>> {
    let connector = create_connector(config, credentials)?;
    Ok(Box::new(Db2Catalog::new(connector)))
}
