// Code generated by pggen, DO NOT EDIT.

//! Data access modules mounted at `crate::db`.

pub use pggen::{
    bind_values, count_clause, decode, row_count, select_clause, Direction, Error, Filter,
    OrderDirection, Result, SelectOptions, SelectResult, SqlValue, ToSqlValue,
};

pub mod projects;
pub use projects::Projects;
pub mod v_free_projects;
pub use v_free_projects::VFreeProjects;
