//! Builds catalog entries from reconciled catalog rows.

use super::reconcile::{find_columns, find_primary_keys, find_tables};
use super::type_mapping::generate_schema;
use crate::Result;
use crate::catalog::{
    Catalog, CatalogEntry, Inclusion, Metadata, Schema, property_breadcrumb, stream_breadcrumb,
};
use crate::models::{Column, Table, TableId, TableType};
use crate::source::CatalogQuery;
use std::collections::BTreeMap;

/// Discovers every table of `source` with at least one column.
///
/// The three catalogs are read one after another. Entries are ordered by
/// schema then table name; any query or row error aborts the whole run.
///
/// # Example
/// ```rust
/// use tapdb2_core::discovery::discover;
/// use tapdb2_core::source::CatalogSnapshot;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let snapshot = CatalogSnapshot::from_json_str(r#"{
///     "format_version": "1.0",
///     "tables": [{"table_schema": "S", "table_name": "T", "table_type": "T"}],
///     "columns": [{"table_schema": "S", "table_name": "T", "column_name": "ID",
///                  "data_type": "SMALLINT"}],
///     "primary_keys": [{"table_schema": "S", "table_name": "T", "column_name": "ID",
///                       "ordinal_position": 1}]
/// }"#)?;
///
/// let catalog = discover(&snapshot).await?;
/// assert_eq!(catalog.streams[0].tap_stream_id, "S-T");
/// assert_eq!(catalog.streams[0].key_properties, Some(vec!["ID".to_string()]));
/// # Ok::<(), tapdb2_core::TapDb2Error>(())
/// # }).unwrap();
/// ```
pub async fn discover(source: &dyn CatalogQuery) -> Result<Catalog> {
    tracing::info!("Discovering catalog from {}", source.describe());

    let tables = find_tables(source).await?;
    let columns = find_columns(source, &tables).await?;
    let primary_keys = find_primary_keys(source, &tables).await?;

    let mut grouped: BTreeMap<TableId, Vec<Column>> = BTreeMap::new();
    for column in columns {
        grouped.entry(column.table_id()).or_default().push(column);
    }

    let streams: Vec<CatalogEntry> = grouped
        .into_iter()
        .filter_map(|(table_id, columns)| {
            let table = tables.get(&table_id)?;
            let key_columns = primary_keys.get(&table_id).map(Vec::as_slice);
            Some(build_entry(table, &columns, key_columns))
        })
        .collect();

    let unsupported = streams
        .iter()
        .filter(|entry| entry.schema.inclusion == Some(Inclusion::Unsupported))
        .count();
    tracing::info!(
        "Discovered {} streams ({} unsupported) from {} tables",
        streams.len(),
        unsupported,
        tables.len()
    );

    Ok(Catalog::new(streams))
}

/// Builds the entry of one table.
pub fn build_entry(
    table: &Table,
    columns: &[Column],
    key_columns: Option<&[String]>,
) -> CatalogEntry {
    let schema = generate_schema(columns, key_columns.unwrap_or_default());
    let metadata = column_metadata(table, columns, &schema, key_columns);

    let mut entry = CatalogEntry {
        tap_stream_id: table.id().to_string(),
        table: table.table_name.clone(),
        stream: table.table_name.clone(),
        database: table.table_schema.clone(),
        schema,
        metadata: metadata.to_list(),
        key_properties: key_columns.map(<[String]>::to_vec),
        is_view: false,
    };
    apply_table_type(&mut entry, table);
    entry
}

/// Stream and column selection metadata.
fn column_metadata(
    table: &Table,
    columns: &[Column],
    schema: &Schema,
    key_columns: Option<&[String]>,
) -> Metadata {
    let root = stream_breadcrumb();
    let mut metadata = Metadata::new()
        .write(&root, "selected-by-default", false)
        .write(&root, "schema-name", table.table_schema.as_str())
        .write(&root, "is-view", table.table_type == TableType::View);
    if let Some(keys) = key_columns {
        metadata = metadata.write(&root, "table-key-properties", keys.to_vec());
    }

    for column in columns {
        let inclusion = schema
            .property(&column.column_name)
            .map_or(Inclusion::Available, Schema::effective_inclusion);
        let breadcrumb = property_breadcrumb(&column.column_name);
        metadata = metadata
            .write(
                &breadcrumb,
                "selected-by-default",
                inclusion != Inclusion::Unsupported,
            )
            .write(&breadcrumb, "sql-datatype", column.native_type())
            .write(&breadcrumb, "inclusion", inclusion.as_str());
    }
    metadata
}

/// Marks views and degrades tables that are neither tables nor views.
fn apply_table_type(entry: &mut CatalogEntry, table: &Table) {
    entry.is_view = table.table_type == TableType::View;
    if !table.table_type.is_supported() {
        entry.schema.inclusion = Some(Inclusion::Unsupported);
        entry.schema.description = Some(format!(
            "Unsupported table type {} ({})",
            table.table_type.code(),
            table.table_type.hint()
        ));
    }
}
