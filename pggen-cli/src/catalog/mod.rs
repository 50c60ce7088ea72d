//! Catalog sources the generator reads relations from

use crate::error::Result;
use async_trait::async_trait;
use pggen_schema::Table;

pub mod postgres;

pub use postgres::PostgresCatalog;

/// Relations of one schema, in generation order
#[async_trait]
pub trait CatalogSource: Send {
    /// Base tables, ordered by name
    async fn tables(&mut self, schema: &str) -> Result<Vec<Table>>;

    /// Views, ordered by name
    async fn views(&mut self, schema: &str) -> Result<Vec<Table>>;

    /// Tables, followed by views when `include_views` is set
    async fn relations(&mut self, schema: &str, include_views: bool) -> Result<Vec<Table>> {
        let mut relations = self.tables(schema).await?;
        if include_views {
            relations.extend(self.views(schema).await?);
        }
        Ok(relations)
    }
}
