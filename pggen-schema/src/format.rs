//! Validation and formatting of generated source

use crate::{Result, SchemaError};
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormatter {
    /// Pipe the source through `rustfmt`
    #[default]
    Rustfmt,
    /// Only check that the source parses
    SyntaxOnly,
}

impl SourceFormatter {
    pub fn format(&self, source: &str) -> Result<String> {
        syn::parse_file(source)
            .map_err(|e| SchemaError::Format(format!("generated source does not parse: {}", e)))?;

        match self {
            SourceFormatter::Rustfmt => rustfmt(source),
            SourceFormatter::SyntaxOnly => Ok(source.to_string()),
        }
    }
}

fn rustfmt(source: &str) -> Result<String> {
    let mut child = Command::new("rustfmt")
        .args(["--edition", "2021"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SchemaError::Format(format!("failed to run rustfmt: {}", e)))?;

    // The handle drops at the end of the statement, closing stdin.
    child
        .stdin
        .take()
        .ok_or_else(|| SchemaError::Format("rustfmt stdin unavailable".to_string()))?
        .write_all(source.as_bytes())?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::debug!("rustfmt failed: {}", stderr);
        return Err(SchemaError::Format(format!(
            "rustfmt exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| SchemaError::Format(format!("rustfmt produced invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_only_keeps_source() {
        let source = "pub struct Projects {\n    pub id: i64,\n}\n";
        assert_eq!(SourceFormatter::SyntaxOnly.format(source).unwrap(), source);
    }

    #[test]
    fn test_invalid_source_is_rejected() {
        let err = SourceFormatter::SyntaxOnly
            .format("pub struct Projects { pub id: }")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Format(_)));
    }
}
