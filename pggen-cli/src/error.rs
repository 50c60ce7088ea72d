use pggen_schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("catalog connection failed: {0}")]
    Connection(String),

    #[error("failed to read catalog for schema [{schema}]: {message}")]
    Catalog { schema: String, message: String },

    #[error("failed to generate code for {kind} [{relation}]: {message}")]
    Generation {
        kind: String,
        relation: String,
        message: String,
    },

    #[error("failed to write file [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub fn catalog(schema: &str, err: impl std::fmt::Display) -> Self {
        GenError::Catalog {
            schema: schema.to_string(),
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the relation being generated to a code generation failure
    pub fn generation(kind: impl ToString, relation: &str, err: SchemaError) -> Self {
        match err {
            SchemaError::Generation {
                kind,
                relation,
                message,
            } => GenError::Generation {
                kind,
                relation,
                message,
            },
            other => GenError::Generation {
                kind: kind.to_string(),
                relation: relation.to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
