//! Offline copies of a schema's metadata names.
//!
//! A snapshot taken from one server can later stand in for that side of a
//! comparison, e.g. to check a staging database against what production
//! looked like at release time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::model::{MetadataCategory, NameList, Scope};
use crate::reader::{MetadataReader, SchemaRef};
use crate::util::{Result, SchemaError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema: String,
    #[serde(default)]
    pub tables: NameList,
    #[serde(default)]
    pub triggers: NameList,
    #[serde(default)]
    pub functions: NameList,
    #[serde(default)]
    pub columns: BTreeMap<String, NameList>,
    #[serde(default)]
    pub indexes: BTreeMap<String, NameList>,
}

impl Snapshot {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Default::default()
        }
    }

    /// Names stored for `category`; tables without an entry have no columns or indexes.
    pub fn names(&self, category: MetadataCategory, table: Option<&str>) -> NameList {
        let per_table = |map: &BTreeMap<String, NameList>| {
            table
                .and_then(|t| map.get(t))
                .cloned()
                .unwrap_or_default()
        };
        match category {
            MetadataCategory::Table => self.tables.clone(),
            MetadataCategory::Trigger => self.triggers.clone(),
            MetadataCategory::Function => self.functions.clone(),
            MetadataCategory::Column => per_table(&self.columns),
            MetadataCategory::Index => per_table(&self.indexes),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::Snapshot(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SchemaError::Snapshot(format!("Invalid snapshot {}: {e}", path.display()))
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SchemaError::Snapshot(format!("Failed to serialize snapshot: {e}")))?;
        fs::write(path, json + "\n").map_err(|e| {
            SchemaError::Snapshot(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

/// Reads every category of `source` into a snapshot.
pub async fn capture_snapshot(source: SchemaRef<'_>) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new(source.schema);
    snapshot.triggers = source.fetch(MetadataCategory::Trigger, None).await?;
    snapshot.functions = source.fetch(MetadataCategory::Function, None).await?;
    snapshot.tables = source.fetch(MetadataCategory::Table, None).await?;

    for table in &snapshot.tables {
        let columns = source.fetch(MetadataCategory::Column, Some(table.as_str())).await?;
        let indexes = source.fetch(MetadataCategory::Index, Some(table.as_str())).await?;
        snapshot.columns.insert(table.clone(), columns);
        snapshot.indexes.insert(table.clone(), indexes);
    }

    tracing::info!(
        source = %source.label(),
        tables = snapshot.tables.len(),
        "captured snapshot"
    );
    Ok(snapshot)
}

#[async_trait]
impl MetadataReader for Snapshot {
    fn describe(&self) -> String {
        format!("snapshot of {}", self.schema)
    }

    /// Serves stored names regardless of the schema in `scope`.
    async fn fetch_names(&self, category: MetadataCategory, scope: Scope<'_>) -> Result<NameList> {
        Ok(self.names(category, scope.table))
    }
}
