//! PostgreSQL catalog introspection

use super::CatalogSource;
use crate::error::{GenError, Result};
use async_trait::async_trait;
use pggen_schema::catalog::{relation_from_catalog, TABLES_QUERY, VIEWS_QUERY};
use pggen_schema::{RelationKind, Table};
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Row};

/// A single connection held for the whole generation run
pub struct PostgresCatalog {
    conn: PgConnection,
}

impl PostgresCatalog {
    pub async fn connect(dsn: &str) -> Result<Self> {
        let conn = PgConnection::connect(dsn)
            .await
            .map_err(|e| GenError::Connection(e.to_string()))?;
        log::debug!("Connected to catalog");
        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| GenError::Connection(format!("failed to close: {}", e)))
    }

    async fn fetch(&mut self, schema: &str, kind: RelationKind, query: &str) -> Result<Vec<Table>> {
        let rows = sqlx::query(query)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| GenError::catalog(schema, e))?;

        let mut relations = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name").map_err(|e| GenError::catalog(schema, e))?;
            let columns: serde_json::Value = row
                .try_get("columns")
                .map_err(|e| GenError::catalog(schema, e))?;

            let relation = relation_from_catalog(kind, &name, columns)
                .map_err(|e| GenError::catalog(schema, e))?;
            relations.push(relation);
        }

        log::debug!(
            "Found {} {}(s) in schema [{}]",
            relations.len(),
            kind,
            schema
        );
        Ok(relations)
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalog {
    async fn tables(&mut self, schema: &str) -> Result<Vec<Table>> {
        self.fetch(schema, RelationKind::Table, TABLES_QUERY).await
    }

    async fn views(&mut self, schema: &str) -> Result<Vec<Table>> {
        self.fetch(schema, RelationKind::View, VIEWS_QUERY).await
    }
}
