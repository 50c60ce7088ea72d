//! pggen-schema - Relation model and code generation for pggen
//!
//! This crate turns catalog metadata for Postgres tables and views into
//! Rust data access modules.
//!
//! # Features
//!
//! - **Relation model** with a fixed mapping from SQL types to Rust types
//! - **Catalog decoding** of the per-relation column aggregates
//! - **Typed templates** whose slots are checked when they are loaded
//! - **Source formatting** through `syn` validation and `rustfmt`
//!
//! # Example
//!
//! ```rust
//! use pggen_schema::codegen::{CodeGenerator, GenerationOptions};
//! use pggen_schema::{Column, RelationKind, SourceFormatter, Table};
//!
//! # fn example() -> pggen_schema::Result<()> {
//! let table = Table::new(
//!     RelationKind::Table,
//!     "projects",
//!     vec![
//!         Column::new("id", "uuid", false, true),
//!         Column::new("name", "text", false, false),
//!     ],
//! );
//!
//! let generator = CodeGenerator::embedded(SourceFormatter::SyntaxOnly)?;
//! let code = generator.generate_relation(&table, &GenerationOptions::new("crate::db"))?;
//! assert!(code.contains("pub struct Projects"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use thiserror::Error;

pub mod catalog;
pub mod codegen;
pub mod format;
pub mod types;

pub use catalog::CatalogColumn;
pub use format::SourceFormatter;
pub use types::*;

/// Schema and code generation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Catalog error for [{relation}]: {message}")]
    Catalog { relation: String, message: String },

    #[error("Fragment '{slot}' is not available for {kind} [{relation}]")]
    FragmentNotAvailable {
        slot: String,
        kind: RelationKind,
        relation: String,
    },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Failed to generate code for {kind} [{relation}]: {message}")]
    Generation {
        kind: String,
        relation: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
