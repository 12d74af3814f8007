//! Joins the three raw catalogs on table identity.
//!
//! Columns and primary key rows whose table is not in the tables catalog
//! (for example physical files filtered out by the tables query) are dropped
//! without error.

use crate::Result;
use crate::models::{Column, Table, TableId};
use crate::source::CatalogQuery;
use futures::TryStreamExt;
use std::collections::BTreeMap;

/// Reads the tables catalog into a map keyed by table identity.
///
/// A repeated identity keeps the last row.
pub async fn find_tables(source: &dyn CatalogQuery) -> Result<BTreeMap<TableId, Table>> {
    let tables: BTreeMap<TableId, Table> = source
        .query_tables()
        .await?
        .map_ok(|table| (table.id(), table))
        .try_collect()
        .await?;
    tracing::debug!("Found {} tables", tables.len());
    Ok(tables)
}

/// Reads the columns catalog, keeping columns of known tables in arrival
/// order.
pub async fn find_columns(
    source: &dyn CatalogQuery,
    tables: &BTreeMap<TableId, Table>,
) -> Result<Vec<Column>> {
    let mut dropped = 0usize;
    let columns: Vec<Column> = source
        .query_columns()
        .await?
        .try_filter(|column| {
            let known = tables.contains_key(&column.table_id());
            if !known {
                dropped += 1;
            }
            futures::future::ready(known)
        })
        .try_collect()
        .await?;

    if dropped > 0 {
        tracing::debug!("Dropped {} columns of tables not in the catalog", dropped);
    }
    tracing::debug!("Found {} columns", columns.len());
    Ok(columns)
}

/// Reads the primary key catalog into each known table's key column names,
/// ordered by ordinal position.
///
/// Repeated ordinal positions within one table keep arrival order and are
/// logged as a warning.
pub async fn find_primary_keys(
    source: &dyn CatalogQuery,
    tables: &BTreeMap<TableId, Table>,
) -> Result<BTreeMap<TableId, Vec<String>>> {
    let mut dropped = 0usize;
    let mut positions: BTreeMap<TableId, Vec<(i32, String)>> = BTreeMap::new();
    let mut rows = source.query_primary_keys().await?;

    while let Some(key) = rows.try_next().await? {
        let table_id = key.table_id();
        if !tables.contains_key(&table_id) {
            dropped += 1;
            continue;
        }
        positions
            .entry(table_id)
            .or_default()
            .push((key.ordinal_position, key.column_name));
    }

    if dropped > 0 {
        tracing::debug!(
            "Dropped {} primary key columns of tables not in the catalog",
            dropped
        );
    }

    let keys = positions
        .into_iter()
        .map(|(table_id, mut columns)| {
            columns.sort_by_key(|(ordinal, _)| *ordinal);
            if columns.windows(2).any(|pair| pair[0].0 == pair[1].0) {
                tracing::warn!(
                    "Primary key of {} has repeated ordinal positions; keeping catalog order",
                    table_id
                );
            }
            let names = columns.into_iter().map(|(_, name)| name).collect();
            (table_id, names)
        })
        .collect();

    Ok(keys)
}
