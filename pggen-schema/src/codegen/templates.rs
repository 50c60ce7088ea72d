//! Typed templates for generated modules
//!
//! A template is plain source text with `{{slot_name}}` markers. Each
//! [`TemplateKind`] accepts a fixed set of [`Slot`]s, and loading a template
//! checks that every marker names a known slot permitted for its kind and
//! that every permitted slot is used. Rendering then pulls one fragment per
//! slot from a [`FragmentSource`], so a loaded template cannot render with
//! markers left in place.

use crate::{Result, SchemaError};
use rust_embed::RustEmbed;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct BuiltinTemplates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Package,
    EntityName,
    Derives,
    EntityFields,
    SqlTableName,
    SqlSelectFields,
    SelectOneScanFields,
    SelectManyScanFields,
    SqlPrimaryKeyColumn,
    PrimaryKeyNote,
    PrimaryKeyAssumed,
    SqlInsertFields,
    SqlInsertPlaceholders,
    InsertValues,
    SqlUpdatePlaceholders,
    UpdateValues,
    UpdateMethod,
    ModuleDeclarations,
}

const ALL_SLOTS: &[Slot] = &[
    Slot::Package,
    Slot::EntityName,
    Slot::Derives,
    Slot::EntityFields,
    Slot::SqlTableName,
    Slot::SqlSelectFields,
    Slot::SelectOneScanFields,
    Slot::SelectManyScanFields,
    Slot::SqlPrimaryKeyColumn,
    Slot::PrimaryKeyNote,
    Slot::PrimaryKeyAssumed,
    Slot::SqlInsertFields,
    Slot::SqlInsertPlaceholders,
    Slot::InsertValues,
    Slot::SqlUpdatePlaceholders,
    Slot::UpdateValues,
    Slot::UpdateMethod,
    Slot::ModuleDeclarations,
];

const TABLE_SLOTS: &[Slot] = &[
    Slot::Package,
    Slot::EntityName,
    Slot::Derives,
    Slot::EntityFields,
    Slot::SqlTableName,
    Slot::SqlSelectFields,
    Slot::SelectOneScanFields,
    Slot::SelectManyScanFields,
    Slot::SqlPrimaryKeyColumn,
    Slot::PrimaryKeyNote,
    Slot::PrimaryKeyAssumed,
    Slot::SqlInsertFields,
    Slot::SqlInsertPlaceholders,
    Slot::InsertValues,
    Slot::UpdateMethod,
];

/// Rendered into the table template's `{{update_method}}` when the table has
/// columns besides its primary key
const UPDATE_SLOTS: &[Slot] = &[
    Slot::SqlTableName,
    Slot::SqlPrimaryKeyColumn,
    Slot::SqlUpdatePlaceholders,
    Slot::UpdateValues,
];

const VIEW_SLOTS: &[Slot] = &[
    Slot::Package,
    Slot::EntityName,
    Slot::Derives,
    Slot::EntityFields,
    Slot::SqlTableName,
    Slot::SqlSelectFields,
    Slot::SelectManyScanFields,
];

const SUPPORT_SLOTS: &[Slot] = &[Slot::Package, Slot::ModuleDeclarations];

impl Slot {
    pub fn name(&self) -> &'static str {
        match self {
            Slot::Package => "package",
            Slot::EntityName => "entity_name",
            Slot::Derives => "derives",
            Slot::EntityFields => "entity_fields",
            Slot::SqlTableName => "sql_table_name",
            Slot::SqlSelectFields => "sql_select_fields",
            Slot::SelectOneScanFields => "select_one_scan_fields",
            Slot::SelectManyScanFields => "select_many_scan_fields",
            Slot::SqlPrimaryKeyColumn => "sql_primary_key_column",
            Slot::PrimaryKeyNote => "primary_key_note",
            Slot::PrimaryKeyAssumed => "primary_key_assumed",
            Slot::SqlInsertFields => "sql_insert_fields",
            Slot::SqlInsertPlaceholders => "sql_insert_placeholders",
            Slot::InsertValues => "insert_values",
            Slot::SqlUpdatePlaceholders => "sql_update_placeholders",
            Slot::UpdateValues => "update_values",
            Slot::UpdateMethod => "update_method",
            Slot::ModuleDeclarations => "module_declarations",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_SLOTS.iter().copied().find(|slot| slot.name() == name)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}}}}}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Table,
    Update,
    View,
    Support,
}

impl TemplateKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Table => "table.rs.template",
            TemplateKind::Update => "update.rs.template",
            TemplateKind::View => "view.rs.template",
            TemplateKind::Support => "support.rs.template",
        }
    }

    pub fn slots(&self) -> &'static [Slot] {
        match self {
            TemplateKind::Table => TABLE_SLOTS,
            TemplateKind::Update => UPDATE_SLOTS,
            TemplateKind::View => VIEW_SLOTS,
            TemplateKind::Support => SUPPORT_SLOTS,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Table => f.write_str("table"),
            TemplateKind::Update => f.write_str("update"),
            TemplateKind::View => f.write_str("view"),
            TemplateKind::Support => f.write_str("support"),
        }
    }
}

/// Supplies the text for each slot while a template renders
pub trait FragmentSource {
    fn fragment(&self, slot: Slot) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    kind: TemplateKind,
    segments: Vec<Segment>,
}

impl Template {
    /// Split `source` into literal text and slots, validating them for `kind`
    pub fn parse(kind: TemplateKind, source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut used = HashSet::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let name = after.find("}}").map(|end| &after[..end]);

            match name {
                Some(name) if is_slot_name(name) => {
                    let slot = Slot::from_name(name).ok_or_else(|| {
                        SchemaError::Template(format!(
                            "unknown slot '{{{{{}}}}}' in {} template",
                            name, kind
                        ))
                    })?;
                    if !kind.slots().contains(&slot) {
                        return Err(SchemaError::Template(format!(
                            "slot '{}' is not available in {} template",
                            slot, kind
                        )));
                    }

                    literal.push_str(&rest[..start]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                    used.insert(slot);
                    rest = &after[name.len() + 2..];
                }
                _ => {
                    literal.push_str(&rest[..start + 2]);
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let missing: Vec<String> = kind
            .slots()
            .iter()
            .filter(|slot| !used.contains(*slot))
            .map(|slot| slot.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::Template(format!(
                "{} template is missing slots: {}",
                kind,
                missing.join(", ")
            )));
        }

        log::debug!(
            "Loaded {} template with {} segments",
            kind,
            segments.len()
        );
        Ok(Self { kind, segments })
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn render(&self, source: &dyn FragmentSource) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(slot) => out.push_str(&source.fragment(*slot)?),
            }
        }
        Ok(out)
    }
}

fn is_slot_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// The templates a generation run needs
#[derive(Debug, Clone)]
pub struct TemplateSet {
    table: Template,
    update: Template,
    view: Template,
    support: Template,
}

impl TemplateSet {
    /// Templates compiled into the binary
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            table: Template::parse(TemplateKind::Table, &builtin(TemplateKind::Table)?)?,
            update: Template::parse(TemplateKind::Update, &builtin(TemplateKind::Update)?)?,
            view: Template::parse(TemplateKind::View, &builtin(TemplateKind::View)?)?,
            support: Template::parse(TemplateKind::Support, &builtin(TemplateKind::Support)?)?,
        })
    }

    /// Templates from `dir`; a kind without a file there uses the built-in one
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SchemaError::Template(format!(
                "template directory [{}] does not exist",
                dir.display()
            )));
        }

        let load = |kind: TemplateKind| -> Result<Template> {
            let path = dir.join(kind.file_name());
            let source = if path.is_file() {
                log::info!("Using {} template [{}]", kind, path.display());
                std::fs::read_to_string(&path)?
            } else {
                log::debug!("No {} template in [{}], using built-in", kind, dir.display());
                builtin(kind)?
            };
            Template::parse(kind, &source).map_err(|e| match e {
                SchemaError::Template(message) => {
                    SchemaError::Template(format!("{}: {}", path.display(), message))
                }
                other => other,
            })
        };

        Ok(Self {
            table: load(TemplateKind::Table)?,
            update: load(TemplateKind::Update)?,
            view: load(TemplateKind::View)?,
            support: load(TemplateKind::Support)?,
        })
    }

    pub fn get(&self, kind: TemplateKind) -> &Template {
        match kind {
            TemplateKind::Table => &self.table,
            TemplateKind::Update => &self.update,
            TemplateKind::View => &self.view,
            TemplateKind::Support => &self.support,
        }
    }
}

fn builtin(kind: TemplateKind) -> Result<String> {
    let file = BuiltinTemplates::get(kind.file_name()).ok_or_else(|| {
        SchemaError::Template(format!("built-in template {} not found", kind.file_name()))
    })?;
    String::from_utf8(file.data.into_owned()).map_err(|e| {
        SchemaError::Template(format!("built-in template {} is not UTF-8: {}", kind.file_name(), e))
    })
}
