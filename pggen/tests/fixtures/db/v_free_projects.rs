// Code generated by pggen, DO NOT EDIT.

use crate::db as dsl;
use sqlx::Row as _;

/// A row of the `v_free_projects` view.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VFreeProjects {
    #[serde(rename = "id")]
    pub id: uuid::Uuid,
    #[serde(rename = "name")]
    pub name: String,
}

impl VFreeProjects {
    pub const VIEW: &'static str = r#"v_free_projects"#;

    /// Counts the rows matching the filters of `options`.
    ///
    /// Ordering and pagination are ignored.
    pub async fn count(
        pool: &sqlx::PgPool,
        options: Option<&dsl::SelectOptions>,
    ) -> dsl::Result<u64> {
        let clause = dsl::count_clause(options)?;
        let mut sql = String::from(r#"SELECT count(*) FROM "v_free_projects""#);
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
        let mut sql = String::from(r#"SELECT "id", "name" FROM "v_free_projects""#);
        sql.push_str(&clause.sql);

        let rows = dsl::bind_values(sqlx::query(&sql), &clause.values)
            .fetch_all(pool)
            .await?;
        let rows = rows
            .iter()
            .map(|row| -> dsl::Result<Self> {
                Ok(Self { id: dsl::decode(row, "id")?, name: dsl::decode(row, "name")? })
            })
            .collect::<dsl::Result<Vec<Self>>>()?;

        Ok(dsl::SelectResult::new(total, rows))
    }
}
