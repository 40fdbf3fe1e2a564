use crate::model::{MetadataCategory, NameList, Scope};
use crate::mysql::connection::MySqlConnection;
use crate::reader::MetadataReader;
use crate::util::{FetchContext, Result, SchemaError};
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::Row;

/// The information_schema query behind each category.
///
/// Every query binds the schema first and, for table-scoped categories, the table second.
pub fn names_query(category: MetadataCategory) -> &'static str {
    match category {
        MetadataCategory::Table => {
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = ?
            ORDER BY table_name
            "#
        }
        MetadataCategory::Trigger => {
            r#"
            SELECT TRIGGER_NAME
            FROM information_schema.triggers
            WHERE TRIGGER_SCHEMA = ?
            ORDER BY TRIGGER_NAME
            "#
        }
        MetadataCategory::Function => {
            r#"
            SELECT ROUTINE_NAME
            FROM information_schema.routines
            WHERE ROUTINE_SCHEMA = ? AND ROUTINE_TYPE = 'FUNCTION'
            ORDER BY ROUTINE_NAME
            "#
        }
        MetadataCategory::Column => {
            r#"
            SELECT COLUMN_NAME
            FROM information_schema.columns
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY COLUMN_NAME
            "#
        }
        // One row per indexed column, so composite indexes repeat their name.
        MetadataCategory::Index => {
            r#"
            SELECT INDEX_NAME
            FROM information_schema.statistics
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY INDEX_NAME
            "#
        }
    }
}

pub async fn fetch_names(
    connection: &MySqlConnection,
    category: MetadataCategory,
    scope: Scope<'_>,
) -> Result<NameList> {
    let context = || FetchContext {
        category,
        source: connection.label().to_string(),
        schema: scope.schema.to_string(),
        table: scope.table.map(str::to_string),
    };

    if category.is_table_scoped() != scope.table.is_some() {
        let expected = if category.is_table_scoped() {
            "a schema and a table"
        } else {
            "a schema only"
        };
        return Err(SchemaError::query(
            context(),
            format!("{category} must be scoped to {expected}"),
        ));
    }

    let mut query = sqlx::query(names_query(category)).bind(scope.schema);
    if let Some(table) = scope.table {
        query = query.bind(table);
    }

    let rows = query
        .fetch_all(connection.pool())
        .await
        .map_err(|e| SchemaError::query(context(), e.to_string()))?;

    let names = rows
        .iter()
        .map(|row| decode_name(row).map_err(|message| SchemaError::scan(context(), message)))
        .collect::<Result<NameList>>()?;

    tracing::debug!(
        %category,
        schema = scope.schema,
        table = scope.table,
        count = names.len(),
        "fetched names"
    );
    Ok(names)
}

/// Some server versions report information_schema names as binary strings.
fn decode_name(row: &MySqlRow) -> std::result::Result<String, String> {
    match row.try_get::<String, _>(0) {
        Ok(name) => Ok(name),
        Err(text_err) => {
            let bytes: Vec<u8> = row
                .try_get(0)
                .map_err(|_| text_err.to_string())?;
            String::from_utf8(bytes).map_err(|e| e.to_string())
        }
    }
}

#[async_trait]
impl MetadataReader for MySqlConnection {
    fn describe(&self) -> String {
        self.label().to_string()
    }

    async fn fetch_names(&self, category: MetadataCategory, scope: Scope<'_>) -> Result<NameList> {
        fetch_names(self, category, scope).await
    }
}
