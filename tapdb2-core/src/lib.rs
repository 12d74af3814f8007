//! Core library for tapdb2, a Singer tap discovering DB2 for i catalogs.
//!
//! Discovery reads three system catalogs (`qsys2.systables`,
//! `qsys2.syscolumns`, and the primary key constraints), joins them on table
//! identity, maps every column's native type to a JSON-Schema fragment and
//! assembles one Singer catalog entry per table.
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - Catalog queries are read-only
//! - Credentials are zeroed from memory on drop
//!
//! # Architecture
//! - `source`: where raw catalog rows come from (live ODBC or a snapshot file)
//! - `discovery`: reconciliation, type mapping and entry assembly
//! - `catalog`: the Singer catalog value objects
//! - `validation`: output checks run before a catalog is written

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod models;
pub mod security;
pub mod source;
pub mod validation;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogEntry, Inclusion, Metadata, Schema};
pub use discovery::discover;
pub use error::{Result, TapDb2Error};
pub use models::{Column, PrimaryKeyColumn, Table, TableId, TableType};
pub use security::{Credentials, parse_connection_string};
pub use source::{
    CatalogQuery, CatalogSnapshot, ConnectionConfig, Connector, Db2Catalog, TapConfig,
    create_catalog, create_connector,
};
pub use validation::{
    ValidationError, initialize_schema_validator, validate_and_parse_catalog, validate_catalog,
    validate_catalog_output,
};
