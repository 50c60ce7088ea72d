//! Dynamic SQL values and the conversions between them, bind parameters and
//! Postgres rows.
//!
//! Generated entities never bind or decode through sqlx directly: parameters
//! travel as [`SqlValue`] slices through [`bind_values`], and every column is
//! read with [`decode`], which widens compatible Postgres types onto the
//! small set of Rust types the generator emits.
//!
//! Columns of any other type are generated as [`SqlValue`] fields and decode
//! by their Postgres type: enums and `TIME`/`INTERVAL` as text, `BYTEA` as
//! bytes, `INET`/`CIDR` as networks, arrays element by element and domains as
//! their base type. Types with no decoding here keep their raw binary value.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use ipnetwork::IpNetwork;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::postgres::types::{Oid, PgInterval};
use sqlx::postgres::{PgArguments, PgRow, PgTypeInfo, PgTypeKind};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo, ValueRef};
use std::fmt;
use uuid::Uuid;

/// A value bound to, or read from, a Postgres statement
///
/// Columns whose type has no dedicated Rust mapping are generated as
/// `SqlValue` fields and decoded by column type.
///
/// Serialization is untagged. Deserializing goes through the variants in
/// order, so JSON input never produces `Bytes`, `Inet` or `Array`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    Json(JsonValue),
    Bytes(Vec<u8>),
    Inet(IpNetwork),
    /// One-dimensional array; bound as a Postgres array literal
    Array(Vec<SqlValue>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Name of the variant, used in log and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::Json(_) => "json",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Inet(_) => "inet",
            SqlValue::Array(_) => "array",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Uuid(u) => write!(f, "{}", u),
            SqlValue::Timestamp(t) => write!(f, "{}", t),
            SqlValue::Json(j) => write!(f, "{}", j),
            SqlValue::Bytes(bytes) => {
                f.write_str("\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            SqlValue::Inet(network) => write!(f, "{}", network),
            SqlValue::Array(items) => f.write_str(&array_literal(items)),
        }
    }
}

/// Postgres array literal with every non-null element quoted, e.g.
/// `{"a","b\"c",NULL}`
fn array_literal(items: &[SqlValue]) -> String {
    let elements: Vec<String> = items
        .iter()
        .map(|item| match item {
            SqlValue::Null => "NULL".to_string(),
            other => format!(
                "\"{}\"",
                other.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            ),
        })
        .collect();
    format!("{{{}}}", elements.join(","))
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Float(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Timestamp(v.and_time(NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v.naive_utc())
    }
}

impl From<JsonValue> for SqlValue {
    fn from(v: JsonValue) -> Self {
        SqlValue::Json(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        SqlValue::Bytes(v.to_vec())
    }
}

impl From<IpNetwork> for SqlValue {
    fn from(v: IpNetwork) -> Self {
        SqlValue::Inet(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(value) => value.into(),
            None => SqlValue::Null,
        }
    }
}

/// Borrowing conversion used by generated `insert`/`update` bodies
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

macro_rules! impl_to_sql_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::from(self.clone())
                }
            }
        )*
    };
}

impl_to_sql_value!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Uuid,
    NaiveDateTime,
    JsonValue,
    Vec<u8>,
    IpNetwork,
);

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(value) => value.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Bind `values` onto `query` in order, so `values[0]` becomes `$1`
pub fn bind_values<'q>(
    query: Query<'q, Postgres, PgArguments>,
    values: &[SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    values.iter().fold(query, bind_value)
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        // Postgres needs a typed NULL; text casts to every column type the
        // generator emits placeholders for. Filters reject NULL values for
        // this reason.
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Uuid(u) => query.bind(*u),
        SqlValue::Timestamp(t) => query.bind(*t),
        SqlValue::Json(j) => query.bind(sqlx::types::Json(j.clone())),
        SqlValue::Bytes(bytes) => query.bind(bytes.clone()),
        SqlValue::Inet(network) => query.bind(*network),
        // Text literal; the `$n::TYPE[]` placeholders cast it to the column type
        SqlValue::Array(items) => query.bind(array_literal(items)),
    }
}

/// Types that can be read from a named column of a Postgres row
pub trait FromColumn: Sized {
    fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error>;
}

/// Read `column` from `row` as `T`
pub fn decode<T: FromColumn>(row: &PgRow, column: &str) -> std::result::Result<T, sqlx::Error> {
    T::from_column(row, column)
}

/// Convert the `count(*)` of a row into an unsigned total
pub fn row_count(count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|_| Error::decode("count", format!("negative count {}", count)))
}

fn column_type<'r>(row: &'r PgRow, column: &str) -> std::result::Result<&'r str, sqlx::Error> {
    Ok(row.try_column(column)?.type_info().name())
}

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    }
}

macro_rules! impl_from_column_direct {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromColumn for $ty {
                fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error> {
                    row.try_get(column)
                }
            }
        )*
    };
}

impl_from_column_direct!(bool, String, Uuid, JsonValue);

impl FromColumn for i64 {
    fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error> {
        match column_type(row, column)? {
            "INT2" => Ok(row.try_get::<i16, _>(column)?.into()),
            "INT4" => Ok(row.try_get::<i32, _>(column)?.into()),
            _ => row.try_get(column),
        }
    }
}

impl FromColumn for f64 {
    fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error> {
        match column_type(row, column)? {
            "FLOAT4" => Ok(row.try_get::<f32, _>(column)?.into()),
            "NUMERIC" => {
                let value: Decimal = row.try_get(column)?;
                value
                    .to_f64()
                    .ok_or_else(|| decode_error(column, format!("numeric {} out of f64 range", value)))
            }
            _ => row.try_get(column),
        }
    }
}

impl FromColumn for NaiveDateTime {
    fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error> {
        match column_type(row, column)? {
            "TIMESTAMPTZ" => Ok(row.try_get::<DateTime<Utc>, _>(column)?.naive_utc()),
            "DATE" => Ok(row.try_get::<NaiveDate, _>(column)?.and_time(NaiveTime::MIN)),
            _ => row.try_get(column),
        }
    }
}

impl FromColumn for SqlValue {
    fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error> {
        if row.try_get_raw(column)?.is_null() {
            return Ok(SqlValue::Null);
        }

        let type_info = row.try_column(column)?.type_info().clone();
        decode_value(row, column, &type_info)
    }
}

/// Decode a non-null value of Postgres type `type_info`.
///
/// The type is matched here, so values are read unchecked; a domain is read
/// as its base type.
fn decode_value(
    row: &PgRow,
    column: &str,
    type_info: &PgTypeInfo,
) -> std::result::Result<SqlValue, sqlx::Error> {
    let value = match type_info.name() {
        "BOOL" => SqlValue::Bool(row.try_get_unchecked(column)?),
        "INT2" => row.try_get_unchecked::<i16, _>(column)?.into(),
        "INT4" => row.try_get_unchecked::<i32, _>(column)?.into(),
        "INT8" => row.try_get_unchecked::<i64, _>(column)?.into(),
        "OID" => row.try_get_unchecked::<Oid, _>(column)?.0.into(),
        "FLOAT4" => row.try_get_unchecked::<f32, _>(column)?.into(),
        "FLOAT8" => row.try_get_unchecked::<f64, _>(column)?.into(),
        "NUMERIC" => numeric(column, row.try_get_unchecked(column)?)?,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            SqlValue::Text(row.try_get_unchecked(column)?)
        }
        "UUID" => SqlValue::Uuid(row.try_get_unchecked(column)?),
        "TIMESTAMP" => SqlValue::Timestamp(row.try_get_unchecked(column)?),
        "TIMESTAMPTZ" => row.try_get_unchecked::<DateTime<Utc>, _>(column)?.into(),
        "DATE" => row.try_get_unchecked::<NaiveDate, _>(column)?.into(),
        "TIME" => SqlValue::Text(row.try_get_unchecked::<NaiveTime, _>(column)?.to_string()),
        "INTERVAL" => SqlValue::Text(interval_text(&row.try_get_unchecked(column)?)),
        "INET" | "CIDR" => SqlValue::Inet(row.try_get_unchecked(column)?),
        "JSON" | "JSONB" => SqlValue::Json(row.try_get_unchecked(column)?),
        "BYTEA" => SqlValue::Bytes(row.try_get_unchecked(column)?),
        other => match type_info.kind() {
            PgTypeKind::Enum(_) => SqlValue::Text(row.try_get_unchecked(column)?),
            PgTypeKind::Domain(base) => return decode_value(row, column, base),
            PgTypeKind::Array(element) => return decode_array(row, column, element),
            _ => {
                log::debug!(
                    "No decoding for column type '{}' of '{}'; keeping the raw value",
                    other,
                    column
                );
                SqlValue::Bytes(row.try_get_unchecked(column)?)
            }
        },
    };
    Ok(value)
}

fn decode_array(
    row: &PgRow,
    column: &str,
    element: &PgTypeInfo,
) -> std::result::Result<SqlValue, sqlx::Error> {
    let items = match element.name() {
        "BOOL" => array_items(row.try_get_unchecked::<Vec<Option<bool>>, _>(column)?),
        "INT2" => array_items(row.try_get_unchecked::<Vec<Option<i16>>, _>(column)?),
        "INT4" => array_items(row.try_get_unchecked::<Vec<Option<i32>>, _>(column)?),
        "INT8" => array_items(row.try_get_unchecked::<Vec<Option<i64>>, _>(column)?),
        "FLOAT4" => array_items(row.try_get_unchecked::<Vec<Option<f32>>, _>(column)?),
        "FLOAT8" => array_items(row.try_get_unchecked::<Vec<Option<f64>>, _>(column)?),
        "NUMERIC" => row
            .try_get_unchecked::<Vec<Option<Decimal>>, _>(column)?
            .into_iter()
            .map(|item| match item {
                Some(value) => numeric(column, value),
                None => Ok(SqlValue::Null),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            array_items(row.try_get_unchecked::<Vec<Option<String>>, _>(column)?)
        }
        "UUID" => array_items(row.try_get_unchecked::<Vec<Option<Uuid>>, _>(column)?),
        "TIMESTAMP" => array_items(row.try_get_unchecked::<Vec<Option<NaiveDateTime>>, _>(column)?),
        "TIMESTAMPTZ" => array_items(row.try_get_unchecked::<Vec<Option<DateTime<Utc>>>, _>(column)?),
        "DATE" => array_items(row.try_get_unchecked::<Vec<Option<NaiveDate>>, _>(column)?),
        "JSON" | "JSONB" => array_items(row.try_get_unchecked::<Vec<Option<JsonValue>>, _>(column)?),
        "BYTEA" => array_items(row.try_get_unchecked::<Vec<Option<Vec<u8>>>, _>(column)?),
        other => match element.kind() {
            PgTypeKind::Enum(_) => array_items(row.try_get_unchecked::<Vec<Option<String>>, _>(column)?),
            _ => {
                return Err(decode_error(
                    column,
                    format!("unsupported array element type '{}'", other),
                ))
            }
        },
    };
    Ok(SqlValue::Array(items))
}

fn array_items<T: Into<SqlValue>>(values: Vec<Option<T>>) -> Vec<SqlValue> {
    values.into_iter().map(SqlValue::from).collect()
}

fn numeric(column: &str, value: Decimal) -> std::result::Result<SqlValue, sqlx::Error> {
    value
        .to_f64()
        .map(SqlValue::Float)
        .ok_or_else(|| decode_error(column, format!("numeric {} out of f64 range", value)))
}

/// Interval in a form Postgres reads back, e.g. `1 mons 2 days 3000000 microseconds`
fn interval_text(interval: &PgInterval) -> String {
    format!(
        "{} mons {} days {} microseconds",
        interval.months, interval.days, interval.microseconds
    )
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(row: &PgRow, column: &str) -> std::result::Result<Self, sqlx::Error> {
        if row.try_get_raw(column)?.is_null() {
            return Ok(None);
        }
        T::from_column(row, column).map(Some)
    }
}
