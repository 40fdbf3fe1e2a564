//! The seam between the comparison engine and wherever metadata comes from.

use async_trait::async_trait;

use crate::model::{MetadataCategory, NameList, Scope};
use crate::util::Result;

/// Source of metadata name lists.
///
/// Every call re-fetches; implementations do not cache.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Credential-free label used in logs and error context.
    fn describe(&self) -> String;

    /// Fetch the names of `category` restricted to `scope`.
    ///
    /// A scope that matches nothing yields an empty list, not an error.
    async fn fetch_names(&self, category: MetadataCategory, scope: Scope<'_>) -> Result<NameList>;
}

/// One side of a comparison: a borrowed reader and the schema to read from it.
///
/// The reader's lifecycle belongs to the caller.
#[derive(Clone, Copy)]
pub struct SchemaRef<'a> {
    pub reader: &'a dyn MetadataReader,
    pub schema: &'a str,
}

impl<'a> SchemaRef<'a> {
    pub fn new(reader: &'a dyn MetadataReader, schema: &'a str) -> Self {
        Self { reader, schema }
    }

    pub async fn fetch(&self, category: MetadataCategory, table: Option<&str>) -> Result<NameList> {
        let scope = Scope {
            schema: self.schema,
            table,
        };
        self.reader.fetch_names(category, scope).await
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.reader.describe(), self.schema)
    }
}
