//! Relation model built from the Postgres catalog

use serde::Serialize;
use std::fmt;

/// Identifier used when a table has no primary key constraint
pub const ASSUMED_PRIMARY_KEY: &str = "id";

/// Rust-side scalar a catalog type is generated as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetType {
    Uuid,
    Text,
    Timestamp,
    Int64,
    Float64,
    Bool,
    /// Untyped fallback, generated as `pggen::SqlValue`
    Any,
}

impl TargetType {
    /// Map a catalog type name, case-insensitively
    pub fn from_sql_type(sql_type: &str) -> Self {
        match sql_type.trim().to_uppercase().as_str() {
            "UUID" => TargetType::Uuid,
            "VARCHAR" | "TEXT" => TargetType::Text,
            "TIMESTAMP" | "TIMESTAMPTZ" | "DATE" | "DATETIME" => TargetType::Timestamp,
            "INT2" | "INT4" | "INT8" | "INTEGER" | "BIGINT" | "SMALLINT" => TargetType::Int64,
            "DECIMAL" | "NUMERIC" | "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE PRECISION" => {
                TargetType::Float64
            }
            "BOOLEAN" | "BOOL" => TargetType::Bool,
            _ => TargetType::Any,
        }
    }

    pub fn rust_type(&self) -> &'static str {
        match self {
            TargetType::Uuid => "uuid::Uuid",
            TargetType::Text => "String",
            TargetType::Timestamp => "chrono::NaiveDateTime",
            TargetType::Int64 => "i64",
            TargetType::Float64 => "f64",
            TargetType::Bool => "bool",
            TargetType::Any => "pggen::SqlValue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    Table,
    View,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Table => f.write_str("table"),
            RelationKind::View => f.write_str("view"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    pub target_type: TargetType,
    pub nullable: bool,
    pub is_primary_key: bool,
}

impl Column {
    pub fn new(name: &str, sql_type: &str, nullable: bool, is_primary_key: bool) -> Self {
        let sql_type = sql_type.trim().to_uppercase();
        Self {
            name: name.to_string(),
            target_type: TargetType::from_sql_type(&sql_type),
            sql_type,
            nullable,
            is_primary_key,
        }
    }

    /// Field type in generated code; nullable columns become `Option<_>`
    /// except for the untyped fallback, which already carries NULL.
    pub fn rust_type(&self) -> String {
        let base = self.target_type.rust_type();
        if self.nullable && self.target_type != TargetType::Any {
            format!("Option<{}>", base)
        } else {
            base.to_string()
        }
    }
}

/// A table or view with its columns in catalog ordinal order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub kind: RelationKind,
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Build a relation, normalising its columns:
    /// views never carry nullability or keys, and a table keeps at most one
    /// primary key column (the first in column order).
    pub fn new(kind: RelationKind, name: &str, mut columns: Vec<Column>) -> Self {
        match kind {
            RelationKind::View => {
                for column in &mut columns {
                    column.nullable = false;
                    column.is_primary_key = false;
                }
            }
            RelationKind::Table => {
                let keys: Vec<&str> = columns
                    .iter()
                    .filter(|c| c.is_primary_key)
                    .map(|c| c.name.as_str())
                    .collect();

                if keys.len() > 1 {
                    log::warn!(
                        "Table [{}] has a composite primary key ({}); only [{}] is used",
                        name,
                        keys.join(", "),
                        keys[0]
                    );
                    let mut seen = false;
                    for column in &mut columns {
                        if column.is_primary_key {
                            column.is_primary_key = !seen;
                            seen = true;
                        }
                    }
                } else if keys.is_empty() {
                    log::warn!(
                        "Table [{}] has no primary key; assuming [{}]",
                        name,
                        ASSUMED_PRIMARY_KEY
                    );
                }
            }
        }

        Self {
            kind,
            name: name.to_string(),
            columns,
        }
    }

    pub fn is_view(&self) -> bool {
        self.kind == RelationKind::View
    }

    pub fn primary_key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// Key column name, falling back to [`ASSUMED_PRIMARY_KEY`]
    pub fn primary_key(&self) -> &str {
        self.primary_key_column()
            .map(|c| c.name.as_str())
            .unwrap_or(ASSUMED_PRIMARY_KEY)
    }

    pub fn primary_key_assumed(&self) -> bool {
        self.primary_key_column().is_none()
    }
}
