//! Text fragments derived from a relation for each template slot

use super::placeholders::{insert_placeholders, update_placeholders};
use super::templates::{FragmentSource, Slot, Template};
use super::{
    column_literal, entity_name, field_name, module_name, quote_identifier, serde_key,
    GenerationOptions,
};
use crate::types::{Column, RelationKind, Table};
use crate::{Result, SchemaError};

/// DSL names re-exported by the support module; an entity with one of these
/// names is declared but not re-exported.
const SUPPORT_EXPORTS: &[&str] = &[
    "Direction",
    "Error",
    "Filter",
    "OrderDirection",
    "Result",
    "SelectOptions",
    "SelectResult",
    "SqlValue",
    "ToSqlValue",
];

/// Fragments for one table or view
pub struct RelationFragments<'a> {
    table: &'a Table,
    options: &'a GenerationOptions,
    update_template: Option<&'a Template>,
}

impl<'a> RelationFragments<'a> {
    pub fn new(table: &'a Table, options: &'a GenerationOptions) -> Self {
        Self {
            table,
            options,
            update_template: None,
        }
    }

    /// Template rendered for the `update_method` slot
    pub fn with_update_template(mut self, template: &'a Template) -> Self {
        self.update_template = Some(template);
        self
    }

    fn table_only(&self, slot: Slot) -> Result<()> {
        match self.table.kind {
            RelationKind::Table => Ok(()),
            RelationKind::View => Err(SchemaError::FragmentNotAvailable {
                slot: slot.name().to_string(),
                kind: self.table.kind,
                relation: self.table.name.clone(),
            }),
        }
    }

    fn non_key_columns(&self) -> impl Iterator<Item = &'a Column> {
        self.table.columns.iter().filter(|c| !c.is_primary_key)
    }

    pub fn entity_name(&self) -> String {
        entity_name(&self.table.name)
    }

    pub fn derives(&self) -> String {
        if self.options.emit_serialization_tags {
            ", serde::Serialize, serde::Deserialize".to_string()
        } else {
            String::new()
        }
    }

    pub fn entity_fields(&self) -> String {
        let mut lines = Vec::new();
        for column in &self.table.columns {
            if self.options.emit_serialization_tags {
                lines.push(format!(
                    "    #[serde(rename = {})]",
                    column_literal(&serde_key(&column.name))
                ));
            }
            lines.push(format!(
                "    pub {}: {},",
                field_name(&column.name),
                column.rust_type()
            ));
        }
        lines.join("\n")
    }

    fn scan_fields(&self, row: &str) -> String {
        self.table
            .columns
            .iter()
            .map(|column| {
                format!(
                    "{}: dsl::decode({}, {})?",
                    field_name(&column.name),
                    row,
                    column_literal(&column.name)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn select_one_scan_fields(&self) -> Result<String> {
        self.table_only(Slot::SelectOneScanFields)?;
        Ok(self.scan_fields("&record"))
    }

    pub fn select_many_scan_fields(&self) -> String {
        self.scan_fields("row")
    }

    pub fn insert_values(&self) -> Result<String> {
        self.table_only(Slot::InsertValues)?;
        Ok(to_sql_values(self.table.columns.iter()))
    }

    pub fn update_values(&self) -> Result<String> {
        self.table_only(Slot::UpdateValues)?;
        Ok(to_sql_values(self.non_key_columns()))
    }

    pub fn sql_table_name(&self) -> String {
        self.table.name.replace('"', "\"\"")
    }

    pub fn sql_select_fields(&self) -> String {
        quoted_columns(self.table.columns.iter())
    }

    pub fn sql_insert_fields(&self) -> Result<String> {
        self.table_only(Slot::SqlInsertFields)?;
        Ok(quoted_columns(self.table.columns.iter()))
    }

    pub fn sql_insert_placeholders(&self) -> Result<String> {
        self.table_only(Slot::SqlInsertPlaceholders)?;
        Ok(insert_placeholders(&self.table.columns))
    }

    pub fn sql_update_placeholders(&self) -> Result<String> {
        self.table_only(Slot::SqlUpdatePlaceholders)?;
        Ok(update_placeholders(&self.table.columns))
    }

    pub fn sql_primary_key(&self) -> Result<String> {
        self.table_only(Slot::SqlPrimaryKeyColumn)?;
        Ok(self.table.primary_key().replace('"', "\"\""))
    }

    pub fn primary_key_note(&self) -> Result<String> {
        self.table_only(Slot::PrimaryKeyNote)?;
        if self.table.primary_key_assumed() {
            Ok(format!(
                "    // NOTE: no primary key constraint was found; `{}` is assumed.",
                self.table.primary_key()
            ))
        } else {
            Ok(String::new())
        }
    }

    pub fn primary_key_assumed(&self) -> Result<String> {
        self.table_only(Slot::PrimaryKeyAssumed)?;
        Ok(self.table.primary_key_assumed().to_string())
    }

    /// The rendered `update` method, or nothing when every column is the key
    pub fn update_method(&self) -> Result<String> {
        self.table_only(Slot::UpdateMethod)?;
        if self.non_key_columns().next().is_none() {
            log::debug!(
                "No update method for table [{}]: it has no non-key columns",
                self.table.name
            );
            return Ok(String::new());
        }

        let template = self.update_template.ok_or_else(|| {
            SchemaError::Template(format!(
                "no update template given for table [{}]",
                self.table.name
            ))
        })?;
        let method = template.render(self)?;
        Ok(format!("\n{}\n", method.trim_end()))
    }
}

impl FragmentSource for RelationFragments<'_> {
    fn fragment(&self, slot: Slot) -> Result<String> {
        match slot {
            Slot::Package => Ok(self.options.package.clone()),
            Slot::EntityName => Ok(self.entity_name()),
            Slot::Derives => Ok(self.derives()),
            Slot::EntityFields => Ok(self.entity_fields()),
            Slot::SqlTableName => Ok(self.sql_table_name()),
            Slot::SqlSelectFields => Ok(self.sql_select_fields()),
            Slot::SelectOneScanFields => self.select_one_scan_fields(),
            Slot::SelectManyScanFields => Ok(self.select_many_scan_fields()),
            Slot::SqlPrimaryKeyColumn => self.sql_primary_key(),
            Slot::PrimaryKeyNote => self.primary_key_note(),
            Slot::PrimaryKeyAssumed => self.primary_key_assumed(),
            Slot::SqlInsertFields => self.sql_insert_fields(),
            Slot::SqlInsertPlaceholders => self.sql_insert_placeholders(),
            Slot::InsertValues => self.insert_values(),
            Slot::SqlUpdatePlaceholders => self.sql_update_placeholders(),
            Slot::UpdateValues => self.update_values(),
            Slot::UpdateMethod => self.update_method(),
            Slot::ModuleDeclarations => Err(SchemaError::FragmentNotAvailable {
                slot: slot.name().to_string(),
                kind: self.table.kind,
                relation: self.table.name.clone(),
            }),
        }
    }
}

fn quoted_columns<'c>(columns: impl Iterator<Item = &'c Column>) -> String {
    columns
        .map(|c| quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql_values<'c>(columns: impl Iterator<Item = &'c Column>) -> String {
    columns
        .map(|c| format!("self.{}.to_sql_value()", field_name(&c.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A generated relation as seen by the support module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub module: String,
    pub entity: String,
}

impl GeneratedModule {
    pub fn for_table(table: &Table) -> Self {
        Self {
            module: module_name(&table.name),
            entity: entity_name(&table.name),
        }
    }
}

/// Fragments for the per-package support module
pub struct SupportFragments<'a> {
    package: &'a str,
    modules: &'a [GeneratedModule],
}

impl<'a> SupportFragments<'a> {
    pub fn new(package: &'a str, modules: &'a [GeneratedModule]) -> Self {
        Self { package, modules }
    }

    pub fn module_declarations(&self) -> String {
        let mut lines = Vec::new();
        for generated in self.modules {
            lines.push(format!("pub mod {};", generated.module));
            if SUPPORT_EXPORTS.contains(&generated.entity.as_str()) {
                log::warn!(
                    "Entity [{}] shadows a DSL export; use it as {}::{}",
                    generated.entity,
                    generated.module,
                    generated.entity
                );
            } else {
                lines.push(format!(
                    "pub use {}::{};",
                    generated.module, generated.entity
                ));
            }
        }
        lines.join("\n")
    }
}

impl FragmentSource for SupportFragments<'_> {
    fn fragment(&self, slot: Slot) -> Result<String> {
        match slot {
            Slot::Package => Ok(self.package.to_string()),
            Slot::ModuleDeclarations => Ok(self.module_declarations()),
            other => Err(SchemaError::Template(format!(
                "slot '{}' is not available in the support module",
                other
            ))),
        }
    }
}
