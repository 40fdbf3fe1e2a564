use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered list of object names of one category, as returned by a metadata fetch.
pub type NameList = Vec<String>;

/// Kind of schema object whose names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataCategory {
    Table,
    Trigger,
    Function,
    Column,
    Index,
}

impl MetadataCategory {
    /// Categories in the order their outcomes first appear in a report.
    /// Column and index outcomes then alternate per table.
    pub const RUN_ORDER: [MetadataCategory; 5] = [
        MetadataCategory::Trigger,
        MetadataCategory::Function,
        MetadataCategory::Table,
        MetadataCategory::Column,
        MetadataCategory::Index,
    ];

    /// Column and index names only exist relative to a table.
    pub fn is_table_scoped(self) -> bool {
        matches!(self, MetadataCategory::Column | MetadataCategory::Index)
    }
}

impl FromStr for MetadataCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "tables" => Ok(MetadataCategory::Table),
            "trigger" | "triggers" => Ok(MetadataCategory::Trigger),
            "function" | "functions" => Ok(MetadataCategory::Function),
            "column" | "columns" => Ok(MetadataCategory::Column),
            "index" | "indexes" => Ok(MetadataCategory::Index),
            _ => Err(format!(
                "Invalid category '{s}'. Valid categories: tables, triggers, functions, columns, indexes"
            )),
        }
    }
}

impl fmt::Display for MetadataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetadataCategory::Table => "tables",
            MetadataCategory::Trigger => "triggers",
            MetadataCategory::Function => "functions",
            MetadataCategory::Column => "columns",
            MetadataCategory::Index => "indexes",
        };
        write!(f, "{s}")
    }
}

/// What a single metadata fetch is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope<'a> {
    pub schema: &'a str,
    pub table: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn schema(schema: &'a str) -> Self {
        Self {
            schema,
            table: None,
        }
    }

    pub fn table(schema: &'a str, table: &'a str) -> Self {
        Self {
            schema,
            table: Some(table),
        }
    }
}
