//! Catalog discovery.
//!
//! Turns the three raw catalogs of a [`CatalogQuery`] source into a Singer
//! [`Catalog`](crate::catalog::Catalog):
//!
//! - `reconcile`: joins tables, columns and primary keys on table identity
//! - `type_mapping`: native DB2 types to JSON-Schema fragments
//! - `assemble`: one catalog entry per table, with metadata and table type
//!   policy
//!
//! [`CatalogQuery`]: crate::source::CatalogQuery

pub mod assemble;
pub mod reconcile;
pub mod type_mapping;

#[cfg(test)]
mod tests;

pub use assemble::discover;
pub use reconcile::{find_columns, find_primary_keys, find_tables};
pub use type_mapping::{TypeFamily, generate_schema, map_column};
