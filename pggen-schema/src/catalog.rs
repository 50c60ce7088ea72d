//! Catalog queries and the typed decoding of their column aggregates
//!
//! Both queries return one row per relation: its name and a JSON array with
//! one object per column. The array is deserialized into [`CatalogColumn`]
//! values; an unexpected shape is an error naming the relation.

use crate::types::{Column, RelationKind, Table};
use crate::{Result, SchemaError};
use serde::Deserialize;

/// Base tables of a schema, ordered by name, columns in ordinal order
pub const TABLES_QUERY: &str = r#"
SELECT
    c.table_name AS name,
    json_agg(json_build_object(
        'name', c.column_name,
        'sql_data_type', UPPER(c.udt_name),
        'nullable', (c.is_nullable = 'YES'),
        'is_primary_key', (kcu.column_name IS NOT NULL)
    ) ORDER BY c.ordinal_position) AS columns
FROM
    information_schema.tables t
INNER JOIN information_schema.columns c ON
    c.table_schema = t.table_schema
    AND c.table_name = t.table_name
LEFT JOIN information_schema.table_constraints tc ON
    tc.table_schema = t.table_schema
    AND tc.table_name = t.table_name
    AND tc.constraint_type = 'PRIMARY KEY'
LEFT JOIN information_schema.key_column_usage kcu ON
    kcu.constraint_schema = tc.constraint_schema
    AND kcu.constraint_name = tc.constraint_name
    AND kcu.table_name = c.table_name
    AND kcu.column_name = c.column_name
WHERE
    t.table_schema = $1
    AND t.table_type = 'BASE TABLE'
GROUP BY
    c.table_name
ORDER BY
    c.table_name
"#;

/// Views of a schema, ordered by name, columns in attribute order
pub const VIEWS_QUERY: &str = r#"
SELECT
    v.table_name AS name,
    json_agg(json_build_object(
        'name', a.attname,
        'sql_data_type', UPPER(ty.typname),
        'nullable', false,
        'is_primary_key', false
    ) ORDER BY a.attnum) AS columns
FROM
    information_schema.views v
INNER JOIN pg_catalog.pg_namespace n ON
    n.nspname = v.table_schema
INNER JOIN pg_catalog.pg_class c ON
    c.relnamespace = n.oid
    AND c.relname = v.table_name
    AND c.relkind = 'v'
INNER JOIN pg_catalog.pg_attribute a ON
    a.attrelid = c.oid
    AND a.attnum > 0
    AND NOT a.attisdropped
INNER JOIN pg_catalog.pg_type ty ON
    ty.oid = a.atttypid
WHERE
    v.table_schema = $1
GROUP BY
    v.table_name
ORDER BY
    v.table_name
"#;

/// One element of the `columns` aggregate
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogColumn {
    pub name: String,
    pub sql_data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
}

impl From<CatalogColumn> for Column {
    fn from(c: CatalogColumn) -> Self {
        Column::new(&c.name, &c.sql_data_type, c.nullable, c.is_primary_key)
    }
}

/// Decode the `columns` aggregate of `relation`
pub fn decode_columns(relation: &str, columns: serde_json::Value) -> Result<Vec<CatalogColumn>> {
    let columns: Vec<CatalogColumn> =
        serde_json::from_value(columns).map_err(|e| SchemaError::Catalog {
            relation: relation.to_string(),
            message: format!("unexpected column metadata: {}", e),
        })?;

    if columns.is_empty() {
        return Err(SchemaError::Catalog {
            relation: relation.to_string(),
            message: "relation has no columns".to_string(),
        });
    }

    Ok(columns)
}

/// Build a [`Table`] from one catalog row
pub fn relation_from_catalog(
    kind: RelationKind,
    name: &str,
    columns: serde_json::Value,
) -> Result<Table> {
    let columns = decode_columns(name, columns)?
        .into_iter()
        .map(Column::from)
        .collect();
    Ok(Table::new(kind, name, columns))
}
