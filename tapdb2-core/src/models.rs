//! Raw catalog records read from the DB2 for i system catalog.
//!
//! These are the reconciler's inputs: one record type per catalog query.
//! They serialize with snake_case field names so they double as the row
//! format of catalog snapshot files.

use serde::{Deserialize, Serialize};

/// Composite identity of a table: (schema name, table name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableId {
    pub schema: String,
    pub name: String,
}

impl TableId {
    /// Creates a table identity.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.schema, self.name)
    }
}

/// Table type code from `qsys2.systables`.
///
/// See the IBM i SQL reference for SYSTABLES: the catalog stores a single
/// letter per table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableType {
    /// `T`: ordinary SQL table
    Table,
    /// `V`: view
    View,
    /// `A`: alias
    Alias,
    /// `L`: logical file
    LogicalFile,
    /// `M`: materialized query table
    MaterializedQueryTable,
    /// `P`: physical file
    PhysicalFile,
    /// Any other code, kept verbatim
    Unknown(String),
}

impl TableType {
    /// Parses a catalog type code. Surrounding blanks (CHAR padding) are ignored.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "T" => Self::Table,
            "V" => Self::View,
            "A" => Self::Alias,
            "L" => Self::LogicalFile,
            "M" => Self::MaterializedQueryTable,
            "P" => Self::PhysicalFile,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The single-letter catalog code.
    pub fn code(&self) -> &str {
        match self {
            Self::Table => "T",
            Self::View => "V",
            Self::Alias => "A",
            Self::LogicalFile => "L",
            Self::MaterializedQueryTable => "M",
            Self::PhysicalFile => "P",
            Self::Unknown(code) => code,
        }
    }

    /// Human readable name, `Unknown` for unrecognized codes.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::View => "View",
            Self::Alias => "Alias",
            Self::LogicalFile => "Logical file",
            Self::MaterializedQueryTable => "Materialized query table",
            Self::PhysicalFile => "Physical file",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Only ordinary tables and views can be replicated.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Table | Self::View)
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for TableType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for TableType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}

/// One row of the tables catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub table_schema: String,
    pub table_name: String,
    pub table_type: TableType,
}

impl Table {
    /// Composite identity of this table.
    pub fn id(&self) -> TableId {
        TableId::new(&self.table_schema, &self.table_name)
    }
}

/// One row of the columns catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    /// Native type name, compared case-insensitively
    pub data_type: String,
    #[serde(default)]
    pub character_maximum_length: Option<i64>,
    #[serde(default)]
    pub numeric_precision: Option<i32>,
    #[serde(default)]
    pub numeric_scale: Option<i32>,
}

impl Column {
    /// Identity of the table owning this column.
    pub fn table_id(&self) -> TableId {
        TableId::new(&self.table_schema, &self.table_name)
    }

    /// Lower-cased native type, as used for matching and metadata.
    pub fn native_type(&self) -> String {
        self.data_type.trim().to_lowercase()
    }
}

/// One row of the primary key catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyColumn {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    /// 1-based position of the column within the key
    pub ordinal_position: i32,
}

impl PrimaryKeyColumn {
    /// Identity of the table owning this key column.
    pub fn table_id(&self) -> TableId {
        TableId::new(&self.table_schema, &self.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_type_codes() {
        for (code, expected) in [
            ("T", TableType::Table),
            ("V", TableType::View),
            ("A", TableType::Alias),
            ("L", TableType::LogicalFile),
            ("M", TableType::MaterializedQueryTable),
            ("P", TableType::PhysicalFile),
        ] {
            let parsed = TableType::from_code(code);
            assert_eq!(parsed, expected);
            assert_eq!(parsed.code(), code);
        }
    }

    #[test]
    fn test_table_type_unknown_keeps_code() {
        let parsed = TableType::from_code("Q ");
        assert_eq!(parsed, TableType::Unknown("Q".to_string()));
        assert_eq!(parsed.code(), "Q");
        assert_eq!(parsed.hint(), "Unknown");
        assert!(!parsed.is_supported());
    }

    #[test]
    fn test_table_type_padding_ignored() {
        assert_eq!(TableType::from_code("V "), TableType::View);
        assert!(TableType::from_code(" T").is_supported());
    }

    #[test]
    fn test_table_id_display() {
        assert_eq!(TableId::new("SALES", "ORDERS").to_string(), "SALES-ORDERS");
    }

    #[test]
    fn test_table_id_ordering() {
        let mut ids = vec![
            TableId::new("B", "A"),
            TableId::new("A", "Z"),
            TableId::new("A", "B"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                TableId::new("A", "B"),
                TableId::new("A", "Z"),
                TableId::new("B", "A"),
            ]
        );
    }

    #[test]
    fn test_column_native_type_is_lowercase() {
        let column = Column {
            table_schema: "S".to_string(),
            table_name: "T".to_string(),
            column_name: "C".to_string(),
            data_type: "VARCHAR".to_string(),
            character_maximum_length: Some(10),
            numeric_precision: None,
            numeric_scale: None,
        };
        assert_eq!(column.native_type(), "varchar");
        assert_eq!(column.table_id(), TableId::new("S", "T"));
    }

    #[test]
    fn test_table_serde_uses_code() {
        let table = Table {
            table_schema: "S".to_string(),
            table_name: "T".to_string(),
            table_type: TableType::LogicalFile,
        };
        let json = serde_json::to_value(&table).expect("serialize");
        assert_eq!(json["table_type"], "L");

        let back: Table = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, table);
    }
}
