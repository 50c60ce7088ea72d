// Code generated by pggen, DO NOT EDIT.

use crate::db as dsl;
use crate::db::ToSqlValue as _;
use sqlx::Row as _;

/// A row of the `projects` table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Projects {
    #[serde(rename = "id")]
    pub id: uuid::Uuid,
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "tier")]
    pub tier: Option<String>,
}

impl Projects {
    pub const TABLE: &'static str = r#"projects"#;

    pub const PRIMARY_KEY: &'static str = r#"id"#;
    pub const PRIMARY_KEY_ASSUMED: bool = false;

    /// Counts the rows matching the filters of `options`.
    ///
    /// Ordering and pagination are ignored.
    pub async fn count(
        pool: &sqlx::PgPool,
        options: Option<&dsl::SelectOptions>,
    ) -> dsl::Result<u64> {
        let clause = dsl::count_clause(options)?;
        let mut sql = String::from(r#"SELECT count(*) FROM "projects""#);
        sql.push_str(&clause.sql);

        let row = dsl::bind_values(sqlx::query(&sql), &clause.values)
            .fetch_one(pool)
            .await?;
        dsl::row_count(row.try_get(0)?)
    }

    /// Selects the rows described by `options`, together with the number of
    /// rows matching its filters.
    pub async fn select(
        pool: &sqlx::PgPool,
        options: Option<&dsl::SelectOptions>,
    ) -> dsl::Result<dsl::SelectResult<Self>> {
        let total = Self::count(pool, options).await?;

        let clause = dsl::select_clause(options)?;
        let mut sql = String::from(r#"SELECT "id", "name", "tier" FROM "projects""#);
        sql.push_str(&clause.sql);

        let rows = dsl::bind_values(sqlx::query(&sql), &clause.values)
            .fetch_all(pool)
            .await?;
        let rows = rows
            .iter()
            .map(|row| -> dsl::Result<Self> {
                Ok(Self { id: dsl::decode(row, "id")?, name: dsl::decode(row, "name")?, tier: dsl::decode(row, "tier")? })
            })
            .collect::<dsl::Result<Vec<Self>>>()?;

        Ok(dsl::SelectResult::new(total, rows))
    }

    /// Fetches the row whose primary key equals `key`.
    pub async fn find(
        pool: &sqlx::PgPool,
        key: impl Into<dsl::SqlValue>,
    ) -> dsl::Result<Option<Self>> {
        let sql = r#"SELECT "id", "name", "tier" FROM "projects" WHERE "id" = $1"#;
        let record = dsl::bind_values(sqlx::query(sql), &[key.into()])
            .fetch_optional(pool)
            .await?;

        match record {
            Some(record) => Ok(Some(Self { id: dsl::decode(&record, "id")?, name: dsl::decode(&record, "name")?, tier: dsl::decode(&record, "tier")? })),
            None => Ok(None),
        }
    }

    /// Inserts this row and returns the number of affected rows.
    pub async fn insert(&self, pool: &sqlx::PgPool) -> dsl::Result<u64> {
        let sql = r#"INSERT INTO "projects" ("id", "name", "tier") VALUES ($1::UUID, $2::TEXT, $3::TEXT)"#;
        let values: Vec<dsl::SqlValue> = vec![self.id.to_sql_value(), self.name.to_sql_value(), self.tier.to_sql_value()];

        let result = dsl::bind_values(sqlx::query(sql), &values)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Writes every non-key column of this row to the row identified by `key`.
    pub async fn update(
        &self,
        pool: &sqlx::PgPool,
        key: impl Into<dsl::SqlValue>,
    ) -> dsl::Result<u64> {
        let sql = r#"UPDATE "projects" SET "name" = $2::TEXT, "tier" = $3::TEXT WHERE "id" = $1"#;
        let values: Vec<dsl::SqlValue> = vec![key.into(), self.name.to_sql_value(), self.tier.to_sql_value()];

        let result = dsl::bind_values(sqlx::query(sql), &values)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deletes the row identified by `key`.
    pub async fn delete(pool: &sqlx::PgPool, key: impl Into<dsl::SqlValue>) -> dsl::Result<u64> {
        let sql = r#"DELETE FROM "projects" WHERE "id" = $1"#;

        let result = dsl::bind_values(sqlx::query(sql), &[key.into()])
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
