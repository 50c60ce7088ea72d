//! Positional placeholder numbering for generated INSERT and UPDATE statements

use super::quote_identifier;
use crate::types::Column;

/// `$1::UUID, $2::TEXT, ...`, one per column including the key
pub fn insert_placeholders(columns: &[Column]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("${}::{}", i + 1, column.sql_type))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"name" = $2::TEXT, ...` for every non-key column.
///
/// `$1` is reserved for the key in the WHERE clause, so numbering starts at 2
/// and only advances on emitted assignments.
pub fn update_placeholders(columns: &[Column]) -> String {
    columns
        .iter()
        .filter(|column| !column.is_primary_key)
        .enumerate()
        .map(|(i, column)| {
            format!(
                "{} = ${}::{}",
                quote_identifier(&column.name),
                i + 2,
                column.sql_type
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
