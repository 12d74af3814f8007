//! DB2 for i system catalog queries.
//!
//! `qsys2.systables` is used instead of `information_schema.tables` because
//! it distinguishes SQL tables from physical and logical files in its
//! `table_type` column.

use super::helpers::RowExt;
use super::{CatalogQuery, Connector, RawRow, RowStream};
use crate::Result;
use crate::models::{Column, PrimaryKeyColumn, Table, TableType};
use async_trait::async_trait;
use futures::StreamExt;

/// Tables catalog. Only SQL tables and views are requested.
pub const TABLES_QUERY: &str = "
    SELECT table_schema,
           table_name,
           table_type
      FROM qsys2.systables
     WHERE table_type IN ('T', 'V')
";

/// Columns catalog.
pub const COLUMNS_QUERY: &str = "
    SELECT table_schema,
           table_name,
           column_name,
           data_type,
           character_maximum_length,
           numeric_precision,
           numeric_scale
      FROM qsys2.syscolumns
";

/// Primary key columns with their position in the key.
pub const PRIMARY_KEYS_QUERY: &str = "
    SELECT A.table_schema,
           A.table_name,
           A.column_name,
           A.ordinal_position
      FROM qsys2.syskeycst A
      JOIN qsys2.syscst B
        ON A.constraint_schema = B.constraint_schema
       AND A.constraint_name = B.constraint_name
     WHERE B.constraint_type = 'PRIMARY KEY'
";

const SYSTABLES: &str = "qsys2.systables";
const SYSCOLUMNS: &str = "qsys2.syscolumns";
const SYSKEYCST: &str = "qsys2.syskeycst";

/// Catalog source issuing the fixed `qsys2` queries through a [`Connector`].
pub struct Db2Catalog {
    connector: Box<dyn Connector>,
}

impl std::fmt::Debug for Db2Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db2Catalog")
            .field("connector", &self.connector.describe())
            .finish()
    }
}

impl Db2Catalog {
    /// Wraps a connector.
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self { connector }
    }

    /// The underlying connector.
    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }
}

#[async_trait]
impl CatalogQuery for Db2Catalog {
    async fn query_tables<'a>(&'a self) -> Result<RowStream<'a, Table>> {
        tracing::debug!("Querying {}", SYSTABLES);
        let rows = self.connector.query(TABLES_QUERY).await?;
        Ok(rows.map(|row| row.and_then(|row| parse_table(&row))).boxed())
    }

    async fn query_columns<'a>(&'a self) -> Result<RowStream<'a, Column>> {
        tracing::debug!("Querying {}", SYSCOLUMNS);
        let rows = self.connector.query(COLUMNS_QUERY).await?;
        Ok(rows.map(|row| row.and_then(|row| parse_column(&row))).boxed())
    }

    async fn query_primary_keys<'a>(&'a self) -> Result<RowStream<'a, PrimaryKeyColumn>> {
        tracing::debug!("Querying {}", SYSKEYCST);
        let rows = self.connector.query(PRIMARY_KEYS_QUERY).await?;
        Ok(rows
            .map(|row| row.and_then(|row| parse_primary_key(&row)))
            .boxed())
    }

    fn describe(&self) -> String {
        self.connector.describe()
    }
}

/// Parses a row of [`TABLES_QUERY`].
pub fn parse_table(row: &RawRow) -> Result<Table> {
    Ok(Table {
        table_schema: row.required_text(0, "table_schema", SYSTABLES)?,
        table_name: row.required_text(1, "table_name", SYSTABLES)?,
        table_type: TableType::from_code(&row.required_text(2, "table_type", SYSTABLES)?),
    })
}

/// Parses a row of [`COLUMNS_QUERY`].
pub fn parse_column(row: &RawRow) -> Result<Column> {
    Ok(Column {
        table_schema: row.required_text(0, "table_schema", SYSCOLUMNS)?,
        table_name: row.required_text(1, "table_name", SYSCOLUMNS)?,
        column_name: row.required_text(2, "column_name", SYSCOLUMNS)?,
        data_type: row.required_text(3, "data_type", SYSCOLUMNS)?,
        character_maximum_length: row.optional_number(
            4,
            "character_maximum_length",
            SYSCOLUMNS,
        )?,
        numeric_precision: row.optional_number(5, "numeric_precision", SYSCOLUMNS)?,
        numeric_scale: row.optional_number(6, "numeric_scale", SYSCOLUMNS)?,
    })
}

/// Parses a row of [`PRIMARY_KEYS_QUERY`].
pub fn parse_primary_key(row: &RawRow) -> Result<PrimaryKeyColumn> {
    Ok(PrimaryKeyColumn {
        table_schema: row.required_text(0, "table_schema", SYSKEYCST)?,
        table_name: row.required_text(1, "table_name", SYSKEYCST)?,
        column_name: row.required_text(2, "column_name", SYSKEYCST)?,
        ordinal_position: row.required_number(3, "ordinal_position", SYSKEYCST)?,
    })
}
