//! Code generation for pggen
//!
//! [`CodeGenerator`] renders one module per relation plus the per-package
//! support module:
//! - table modules with `count`, `select`, `find`, `insert`, `update` and
//!   `delete`; `update` is left out when the primary key is the only column
//! - view modules with `count` and `select`
//! - a `mod.rs` that re-exports the runtime DSL and declares every module

use crate::format::SourceFormatter;
use crate::types::Table;
use crate::{Result, SchemaError};

pub mod fragments;
pub mod placeholders;
pub mod templates;

pub use fragments::{GeneratedModule, RelationFragments, SupportFragments};
pub use placeholders::{insert_placeholders, update_placeholders};
pub use templates::{FragmentSource, Slot, Template, TemplateKind, TemplateSet};

/// Per-schema generation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Rust path the output directory is mounted at, e.g. `crate::db`
    pub package: String,
    pub emit_serialization_tags: bool,
}

impl GenerationOptions {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            emit_serialization_tags: false,
        }
    }

    pub fn with_serialization_tags(mut self, emit: bool) -> Self {
        self.emit_serialization_tags = emit;
        self
    }
}

/// Renders and formats generated modules
pub struct CodeGenerator {
    templates: TemplateSet,
    formatter: SourceFormatter,
}

impl CodeGenerator {
    pub fn new(templates: TemplateSet, formatter: SourceFormatter) -> Self {
        Self {
            templates,
            formatter,
        }
    }

    /// Generator over the built-in templates
    pub fn embedded(formatter: SourceFormatter) -> Result<Self> {
        Ok(Self::new(TemplateSet::embedded()?, formatter))
    }

    /// Source of the module for `table`
    pub fn generate_relation(&self, table: &Table, options: &GenerationOptions) -> Result<String> {
        let kind = if table.is_view() {
            TemplateKind::View
        } else {
            TemplateKind::Table
        };

        let fragments = RelationFragments::new(table, options)
            .with_update_template(self.templates.get(TemplateKind::Update));
        self.templates
            .get(kind)
            .render(&fragments)
            .and_then(|source| self.formatter.format(&source))
            .map_err(|e| SchemaError::Generation {
                kind: table.kind.to_string(),
                relation: table.name.clone(),
                message: e.to_string(),
            })
    }

    /// Source of the support module declaring `modules`
    pub fn generate_support(&self, package: &str, modules: &[GeneratedModule]) -> Result<String> {
        let fragments = SupportFragments::new(package, modules);
        self.templates
            .get(TemplateKind::Support)
            .render(&fragments)
            .and_then(|source| self.formatter.format(&source))
            .map_err(|e| SchemaError::Generation {
                kind: "package".to_string(),
                relation: package.to_string(),
                message: e.to_string(),
            })
    }
}

// String transformation utilities

/// Lower snake case; word boundaries are separators and lower-to-upper
/// transitions
pub fn to_snake_case(input: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;

    for ch in input.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            result.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    result.trim_end_matches('_').to_string()
}

pub fn to_pascal_case(input: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;

    for ch in input.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

/// Escape Rust reserved keywords by adding r# prefix
pub fn escape_rust_keyword(name: &str) -> String {
    const RUST_KEYWORDS: &[&str] = &[
        "type", "match", "if", "else", "while", "for", "loop", "fn", "let", "mut", "const",
        "static", "struct", "enum", "trait", "impl", "mod", "use", "pub", "return", "break",
        "continue", "true", "false", "in", "as", "where", "async", "await", "dyn", "move", "ref",
        "macro", "union", "unsafe", "extern", "yield", "try", "typeof", "abstract", "become",
        "box", "do", "final", "override", "priv", "unsized", "virtual", "gen",
    ];
    // These cannot be raw identifiers.
    const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

    if RESERVED.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Replace characters that cannot appear in an identifier and make sure it
/// does not start with a digit
fn sanitize_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

pub fn entity_name(relation: &str) -> String {
    escape_rust_keyword(&sanitize_identifier(&to_pascal_case(relation)))
}

pub fn field_name(column: &str) -> String {
    escape_rust_keyword(&sanitize_identifier(&to_snake_case(column)))
}

/// Serialization key for a column
pub fn serde_key(column: &str) -> String {
    to_snake_case(column)
}

/// Module identifier of a relation; `mod` is taken by the support module
pub fn module_name(relation: &str) -> String {
    let stem = sanitize_identifier(&to_snake_case(relation));
    if stem == "mod" {
        return "mod_".to_string();
    }
    escape_rust_keyword(&stem)
}

/// File a relation module is written to, relative to the output directory
pub fn module_file_name(relation: &str) -> String {
    let module = module_name(relation);
    format!("{}.rs", module.trim_start_matches("r#"))
}

/// Double-quoted SQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A Rust string literal holding `value`
pub fn column_literal(value: &str) -> String {
    format!("{:?}", value)
}
