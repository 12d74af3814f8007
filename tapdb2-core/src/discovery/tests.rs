use super::*;
use crate::Result;
use crate::catalog::{Inclusion, JsonType, property_breadcrumb, stream_breadcrumb};
use crate::error::TapDb2Error;
use crate::models::{Column, PrimaryKeyColumn, Table, TableType};
use crate::source::{CatalogQuery, CatalogSnapshot, RowStream};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde_json::{Value, json};

fn table(schema: &str, name: &str, code: &str) -> Table {
    Table {
        table_schema: schema.to_string(),
        table_name: name.to_string(),
        table_type: TableType::from_code(code),
    }
}

fn column(schema: &str, table: &str, name: &str, data_type: &str) -> Column {
    Column {
        table_schema: schema.to_string(),
        table_name: table.to_string(),
        column_name: name.to_string(),
        data_type: data_type.to_string(),
        character_maximum_length: None,
        numeric_precision: None,
        numeric_scale: None,
    }
}

fn key(schema: &str, table: &str, name: &str, ordinal: i32) -> PrimaryKeyColumn {
    PrimaryKeyColumn {
        table_schema: schema.to_string(),
        table_name: table.to_string(),
        column_name: name.to_string(),
        ordinal_position: ordinal,
    }
}

/// Source whose columns query fails midway.
struct BrokenColumns;

#[async_trait]
impl CatalogQuery for BrokenColumns {
    async fn query_tables<'a>(&'a self) -> Result<RowStream<'a, Table>> {
        Ok(stream::iter(vec![Ok(table("S", "T", "T"))]).boxed())
    }

    async fn query_columns<'a>(&'a self) -> Result<RowStream<'a, Column>> {
        Ok(stream::iter(vec![
            Ok(column("S", "T", "ID", "INTEGER")),
            Err(TapDb2Error::query_failed("cursor closed")),
        ])
        .boxed())
    }

    async fn query_primary_keys<'a>(&'a self) -> Result<RowStream<'a, PrimaryKeyColumn>> {
        Ok(stream::empty().boxed())
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

#[tokio::test]
async fn test_smallint_sole_primary_key() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T")],
        vec![column("S", "T", "ID", "smallint")],
        vec![key("S", "T", "ID", 1)],
    );

    let catalog = discover(&source).await.unwrap();
    assert_eq!(catalog.len(), 1);

    let entry = catalog.get_stream("S-T").unwrap();
    assert_eq!(entry.database, "S");
    assert_eq!(entry.table, "T");
    assert_eq!(entry.stream, "T");
    assert!(!entry.is_view);
    assert_eq!(entry.key_properties, Some(vec!["ID".to_string()]));
    assert_eq!(
        serde_json::to_value(entry.schema.property("ID").unwrap()).unwrap(),
        json!({
            "type": ["null", "integer"],
            "inclusion": "automatic",
            "minimum": -32768,
            "maximum": 32767
        })
    );
}

#[tokio::test]
async fn test_unsupported_column_type() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T")],
        vec![column("S", "T", "WEIRD", "FLOOGLE")],
        vec![],
    );

    let catalog = discover(&source).await.unwrap();
    let entry = catalog.get_stream("S-T").unwrap();
    let fragment = entry.schema.property("WEIRD").unwrap();

    assert_eq!(fragment.inclusion, Some(Inclusion::Unsupported));
    assert_eq!(
        fragment.description.as_deref(),
        Some("Unsupported data type floogle")
    );
    assert_eq!(fragment.json_type, None);

    let crumb = property_breadcrumb("WEIRD");
    assert_eq!(
        entry.metadata_value(&crumb, "selected-by-default"),
        Some(&Value::Bool(false))
    );
    assert_eq!(
        entry.metadata_value(&crumb, "sql-datatype"),
        Some(&json!("floogle"))
    );
    assert_eq!(entry.key_properties, None);
}

#[tokio::test]
async fn test_logical_file_is_unsupported() {
    let source = CatalogSnapshot::new(
        vec![table("S", "LF", "L")],
        vec![column("S", "LF", "ID", "INTEGER")],
        vec![],
    );

    let catalog = discover(&source).await.unwrap();
    let entry = catalog.get_stream("S-LF").unwrap();

    assert_eq!(entry.schema.inclusion, Some(Inclusion::Unsupported));
    assert_eq!(
        entry.schema.description.as_deref(),
        Some("Unsupported table type L (Logical file)")
    );
}

#[tokio::test]
async fn test_unknown_table_type_description() {
    let source = CatalogSnapshot::new(
        vec![table("S", "X", "Q")],
        vec![column("S", "X", "ID", "INTEGER")],
        vec![],
    );

    let catalog = discover(&source).await.unwrap();
    let entry = catalog.get_stream("S-X").unwrap();
    assert_eq!(
        entry.schema.description.as_deref(),
        Some("Unsupported table type Q (Unknown)")
    );
}

#[tokio::test]
async fn test_zero_length_varchar() {
    let mut name = column("S", "T", "NAME", "VARCHAR");
    name.character_maximum_length = Some(0);
    let source = CatalogSnapshot::new(vec![table("S", "T", "T")], vec![name], vec![]);

    let catalog = discover(&source).await.unwrap();
    let fragment = catalog.streams[0].schema.property("NAME").unwrap();
    assert_eq!(fragment.json_type, Some(JsonType::nullable("string")));
    assert_eq!(fragment.max_length, None);
}

#[tokio::test]
async fn test_decimal_ten_two() {
    let mut amount = column("S", "T", "AMOUNT", "DECIMAL");
    amount.numeric_precision = Some(10);
    amount.numeric_scale = Some(2);
    let source = CatalogSnapshot::new(vec![table("S", "T", "T")], vec![amount], vec![]);

    let catalog = discover(&source).await.unwrap();
    let fragment = serde_json::to_value(catalog.streams[0].schema.property("AMOUNT").unwrap())
        .unwrap();
    assert_eq!(fragment["multipleOf"], json!(0.01));
    assert_eq!(fragment["maximum"], json!(100000000));
    assert_eq!(fragment["minimum"], json!(-100000000));
    assert_eq!(fragment["exclusiveMaximum"], json!(true));
    assert_eq!(fragment["exclusiveMinimum"], json!(true));
}

#[tokio::test]
async fn test_view_flag_and_metadata() {
    let source = CatalogSnapshot::new(
        vec![table("S", "V1", "V")],
        vec![
            column("S", "V1", "A", "CHAR"),
            column("S", "V1", "B", "DATE"),
        ],
        vec![],
    );

    let catalog = discover(&source).await.unwrap();
    let entry = &catalog.streams[0];
    assert!(entry.is_view);
    assert_eq!(entry.schema.inclusion, None);

    let root = stream_breadcrumb();
    assert_eq!(
        entry.metadata_value(&root, "selected-by-default"),
        Some(&json!(false))
    );
    assert_eq!(entry.metadata_value(&root, "is-view"), Some(&json!(true)));
    assert_eq!(entry.metadata_value(&root, "schema-name"), Some(&json!("S")));
    assert_eq!(entry.metadata_value(&root, "table-key-properties"), None);

    let a = property_breadcrumb("A");
    assert_eq!(
        entry.metadata_value(&a, "selected-by-default"),
        Some(&json!(true))
    );
    assert_eq!(entry.metadata_value(&a, "sql-datatype"), Some(&json!("char")));
    assert_eq!(entry.metadata_value(&a, "inclusion"), Some(&json!("available")));

    // Root first, then columns in catalog order
    let crumbs: Vec<_> = entry.metadata.iter().map(|m| m.breadcrumb.clone()).collect();
    assert_eq!(crumbs, vec![root, a, property_breadcrumb("B")]);
}

#[tokio::test]
async fn test_composite_key_ordered_by_ordinal() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T")],
        vec![
            column("S", "T", "A", "INTEGER"),
            column("S", "T", "B", "INTEGER"),
            column("S", "T", "C", "INTEGER"),
        ],
        vec![key("S", "T", "C", 2), key("S", "T", "A", 1)],
    );

    let catalog = discover(&source).await.unwrap();
    let entry = &catalog.streams[0];
    assert_eq!(
        entry.key_properties,
        Some(vec!["A".to_string(), "C".to_string()])
    );
    assert_eq!(
        entry.metadata_value(&stream_breadcrumb(), "table-key-properties"),
        Some(&json!(["A", "C"]))
    );
    assert_eq!(
        entry.schema.property("B").unwrap().inclusion,
        Some(Inclusion::Available)
    );
    assert_eq!(
        entry.schema.property("C").unwrap().inclusion,
        Some(Inclusion::Automatic)
    );
}

#[tokio::test]
async fn test_orphans_dropped_and_empty_tables_omitted() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T"), table("S", "EMPTY", "T")],
        vec![
            column("S", "T", "ID", "INTEGER"),
            column("QSYS", "PF", "X", "INTEGER"),
        ],
        vec![key("QSYS", "PF", "X", 1)],
    );

    let catalog = discover(&source).await.unwrap();
    let ids: Vec<&str> = catalog
        .streams
        .iter()
        .map(|e| e.tap_stream_id.as_str())
        .collect();
    assert_eq!(ids, vec!["S-T"]);
}

#[tokio::test]
async fn test_entries_ordered_by_table_id() {
    let source = CatalogSnapshot::new(
        vec![table("B", "X", "T"), table("A", "Z", "T"), table("A", "Y", "T")],
        vec![
            column("B", "X", "ID", "INTEGER"),
            column("A", "Z", "ID", "INTEGER"),
            column("A", "Y", "ID", "INTEGER"),
            column("B", "X", "NAME", "VARCHAR"),
        ],
        vec![],
    );

    let catalog = discover(&source).await.unwrap();
    let ids: Vec<&str> = catalog
        .streams
        .iter()
        .map(|e| e.tap_stream_id.as_str())
        .collect();
    assert_eq!(ids, vec!["A-Y", "A-Z", "B-X"]);
    assert_eq!(catalog.streams[2].schema.properties.as_ref().unwrap().len(), 2);
}

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T"), table("S", "V", "V")],
        vec![
            column("S", "T", "ID", "BIGINT"),
            column("S", "T", "AT", "TIMESTMP"),
            column("S", "V", "N", "NUMERIC"),
        ],
        vec![key("S", "T", "ID", 1)],
    );

    let first = discover(&source).await.unwrap().to_json_pretty().unwrap();
    let second = discover(&source).await.unwrap().to_json_pretty().unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_query_error_aborts_discovery() {
    let result = discover(&BrokenColumns).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("cursor closed"));
}

#[tokio::test]
async fn test_find_primary_keys_duplicate_ordinals_keep_arrival_order() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T")],
        vec![],
        vec![key("S", "T", "B", 1), key("S", "T", "A", 1)],
    );

    let tables = find_tables(&source).await.unwrap();
    let keys = find_primary_keys(&source, &tables).await.unwrap();
    let table_id = crate::models::TableId::new("S", "T");
    assert_eq!(
        keys.get(&table_id),
        Some(&vec!["B".to_string(), "A".to_string()])
    );
}

#[tokio::test]
async fn test_find_columns_keeps_arrival_order() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T")],
        vec![
            column("S", "T", "Z", "INTEGER"),
            column("S", "GONE", "Q", "INTEGER"),
            column("S", "T", "A", "INTEGER"),
        ],
        vec![],
    );

    let tables = find_tables(&source).await.unwrap();
    let columns = find_columns(&source, &tables).await.unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
    assert_eq!(names, vec!["Z", "A"]);
}

#[tokio::test]
async fn test_discover_properties_follow_column_order() {
    let source = CatalogSnapshot::new(
        vec![table("S", "T", "T")],
        vec![
            column("S", "T", "ZED", "INTEGER"),
            column("S", "T", "ALPHA", "VARCHAR"),
            column("S", "T", "MID", "DATE"),
        ],
        vec![],
    );

    let catalog = discover(&source).await.unwrap();
    let names: Vec<&str> = catalog.streams[0]
        .schema
        .properties
        .as_ref()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(names, vec!["ZED", "ALPHA", "MID"]);

    let json = catalog.to_json_pretty().unwrap();
    let zed = json.find("\"ZED\": {").unwrap();
    let alpha = json.find("\"ALPHA\": {").unwrap();
    let mid = json.find("\"MID\": {").unwrap();
    assert!(zed < alpha && alpha < mid);
}
