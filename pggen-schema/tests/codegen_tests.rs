//! Tests for module generation over the built-in and overridden templates

use pggen_schema::codegen::{CodeGenerator, GeneratedModule, GenerationOptions, TemplateSet};
use pggen_schema::{Column, RelationKind, SchemaError, SourceFormatter, Table};
use std::fs;

fn projects() -> Table {
    Table::new(
        RelationKind::Table,
        "projects",
        vec![
            Column::new("id", "uuid", false, true),
            Column::new("name", "text", false, false),
            Column::new("tier", "text", false, false),
        ],
    )
}

fn free_projects_view() -> Table {
    Table::new(
        RelationKind::View,
        "v_free_projects",
        vec![
            Column::new("id", "uuid", false, false),
            Column::new("name", "text", false, false),
        ],
    )
}

fn generator() -> CodeGenerator {
    CodeGenerator::embedded(SourceFormatter::SyntaxOnly).unwrap()
}

#[test]
fn test_table_module() {
    let code = generator()
        .generate_relation(&projects(), &GenerationOptions::new("crate::db"))
        .unwrap();

    assert!(code.contains("use crate::db as dsl;"));
    assert!(code.contains("pub struct Projects {"));
    assert!(code.contains("pub id: uuid::Uuid,"));
    assert!(code.contains("pub const TABLE: &'static str = r#\"projects\"#;"));
    assert!(code.contains("pub const PRIMARY_KEY: &'static str = r#\"id\"#;"));
    assert!(code.contains("pub const PRIMARY_KEY_ASSUMED: bool = false;"));
    assert!(code.contains("SELECT \"id\", \"name\", \"tier\" FROM \"projects\""));
    assert!(code.contains(
        "INSERT INTO \"projects\" (\"id\", \"name\", \"tier\") VALUES ($1::UUID, $2::TEXT, $3::TEXT)"
    ));
    assert!(code.contains(
        "UPDATE \"projects\" SET \"name\" = $2::TEXT, \"tier\" = $3::TEXT WHERE \"id\" = $1"
    ));
    assert!(code.contains("vec![key.into(), self.name.to_sql_value(), self.tier.to_sql_value()]"));
    assert!(code.contains("DELETE FROM \"projects\" WHERE \"id\" = $1"));
    assert!(!code.contains("{{"));
}

#[test]
fn test_view_module() {
    let code = generator()
        .generate_relation(&free_projects_view(), &GenerationOptions::new("crate::db"))
        .unwrap();

    assert!(code.contains("pub struct VFreeProjects {"));
    assert!(code.contains("pub const VIEW: &'static str = r#\"v_free_projects\"#;"));
    assert!(code.contains("pub async fn count("));
    assert!(code.contains("pub async fn select("));
    assert!(!code.contains("INSERT INTO"));
    assert!(!code.contains("UPDATE "));
    assert!(!code.contains("PRIMARY_KEY"));
}

#[test]
fn test_generation_is_deterministic() {
    let generator = generator();
    let options = GenerationOptions::new("crate::db").with_serialization_tags(true);

    let first = generator.generate_relation(&projects(), &options).unwrap();
    let second = generator.generate_relation(&projects(), &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_serialization_tags() {
    let table = Table::new(
        RelationKind::Table,
        "accounts",
        vec![
            Column::new("id", "int8", false, true),
            Column::new("displayName", "varchar", true, false),
            Column::new("settings", "jsonb", true, false),
        ],
    );
    let options = GenerationOptions::new("crate::db").with_serialization_tags(true);

    let code = generator().generate_relation(&table, &options).unwrap();

    assert!(code.contains("#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]"));
    assert!(code.contains("#[serde(rename = \"display_name\")]"));
    assert!(code.contains("pub display_name: Option<String>,"));
    assert!(code.contains("pub settings: pggen::SqlValue,"));
}

#[test]
fn test_assumed_primary_key_is_visible() {
    let table = Table::new(
        RelationKind::Table,
        "audit_log",
        vec![
            Column::new("message", "text", false, false),
            Column::new("created_at", "timestamptz", false, false),
        ],
    );

    let code = generator()
        .generate_relation(&table, &GenerationOptions::new("crate::db"))
        .unwrap();

    assert!(code.contains("// NOTE: no primary key constraint was found; `id` is assumed."));
    assert!(code.contains("pub const PRIMARY_KEY_ASSUMED: bool = true;"));
    assert!(code.contains("WHERE \"id\" = $1"));
}

#[test]
fn test_key_only_table_has_no_update() {
    let table = Table::new(
        RelationKind::Table,
        "tags",
        vec![Column::new("id", "int8", false, true)],
    );

    let code = generator()
        .generate_relation(&table, &GenerationOptions::new("crate::db"))
        .unwrap();

    assert!(!code.contains("UPDATE "), "{}", code);
    assert!(!code.contains("pub async fn update("));
    assert!(code.contains("INSERT INTO \"tags\" (\"id\") VALUES ($1::INT8)"));
    assert!(code.contains("DELETE FROM \"tags\" WHERE \"id\" = $1"));
}

#[test]
fn test_keyword_columns() {
    let table = Table::new(
        RelationKind::Table,
        "events",
        vec![
            Column::new("id", "int8", false, true),
            Column::new("type", "text", false, false),
        ],
    );

    let code = generator()
        .generate_relation(&table, &GenerationOptions::new("crate::db"))
        .unwrap();

    assert!(code.contains("pub r#type: String,"));
    assert!(code.contains("r#type: dsl::decode(row, \"type\")?"));
    assert!(code.contains("self.r#type.to_sql_value()"));
}

#[test]
fn test_support_module() {
    let modules = vec![
        GeneratedModule::for_table(&projects()),
        GeneratedModule::for_table(&free_projects_view()),
    ];

    let code = generator().generate_support("crate::db", &modules).unwrap();

    assert!(code.contains("pub use pggen::{"));
    assert!(code.contains("pub mod projects;\npub use projects::Projects;"));
    assert!(code.contains("pub mod v_free_projects;\npub use v_free_projects::VFreeProjects;"));
}

#[test]
fn test_invalid_package_fails_generation() {
    let err = generator()
        .generate_relation(&projects(), &GenerationOptions::new("not a path"))
        .unwrap_err();

    match err {
        SchemaError::Generation { relation, kind, .. } => {
            assert_eq!(relation, "projects");
            assert_eq!(kind, "table");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_template_directory_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("support.rs.template"),
        "// custom support for {{package}}\n{{module_declarations}}\n",
    )
    .unwrap();

    let templates = TemplateSet::from_dir(dir.path()).unwrap();
    let generator = CodeGenerator::new(templates, SourceFormatter::SyntaxOnly);

    let code = generator
        .generate_support("crate::db", &[GeneratedModule::for_table(&projects())])
        .unwrap();
    assert_eq!(
        code,
        "// custom support for crate::db\npub mod projects;\npub use projects::Projects;\n"
    );

    // Kinds without a file fall back to the built-in template
    let table = generator
        .generate_relation(&projects(), &GenerationOptions::new("crate::db"))
        .unwrap();
    assert!(table.contains("pub struct Projects {"));
}

#[test]
fn test_invalid_template_override_names_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("view.rs.template"),
        "pub struct {{entity_name}};\n{{sql_insert_placeholders}}\n",
    )
    .unwrap();

    let err = TemplateSet::from_dir(dir.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("view.rs.template"), "{}", message);
    assert!(message.contains("not available in view template"), "{}", message);
}

#[test]
fn test_update_template_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("update.rs.template"),
        "    // update {{sql_table_name}} by {{sql_primary_key_column}}: {{sql_update_placeholders}} / {{update_values}}\n",
    )
    .unwrap();

    let generator = CodeGenerator::new(
        TemplateSet::from_dir(dir.path()).unwrap(),
        SourceFormatter::SyntaxOnly,
    );
    let code = generator
        .generate_relation(&projects(), &GenerationOptions::new("crate::db"))
        .unwrap();

    assert!(code.contains(
        "// update projects by id: \"name\" = $2::TEXT, \"tier\" = $3::TEXT / self.name.to_sql_value(), self.tier.to_sql_value()"
    ));
    assert!(!code.contains("pub async fn update("));

    fs::write(
        dir.path().join("update.rs.template"),
        "{{entity_name}} {{sql_table_name}} {{sql_primary_key_column}} {{sql_update_placeholders}} {{update_values}}",
    )
    .unwrap();
    let message = TemplateSet::from_dir(dir.path()).unwrap_err().to_string();
    assert!(message.contains("not available in update template"), "{}", message);
}

#[test]
fn test_missing_template_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    assert!(matches!(
        TemplateSet::from_dir(&missing),
        Err(SchemaError::Template(_))
    ));
}

/// Tokens of a source file, ignoring layout
fn tokens(source: &str) -> Vec<&str> {
    source.split_whitespace().collect()
}

fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../pggen/tests/fixtures/db")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[test]
fn test_runtime_fixture_matches_generator() {
    let generator = generator();
    let options = GenerationOptions::new("crate::db").with_serialization_tags(true);
    let table = Table::new(
        RelationKind::Table,
        "projects",
        vec![
            Column::new("id", "uuid", false, true),
            Column::new("name", "text", false, false),
            Column::new("tier", "text", true, false),
        ],
    );
    let view = free_projects_view();

    let projects = generator.generate_relation(&table, &options).unwrap();
    let free_projects = generator.generate_relation(&view, &options).unwrap();
    let support = generator
        .generate_support(
            "crate::db",
            &[GeneratedModule::for_table(&table), GeneratedModule::for_table(&view)],
        )
        .unwrap();

    assert_eq!(tokens(&fixture("projects.rs")), tokens(&projects));
    assert_eq!(tokens(&fixture("v_free_projects.rs")), tokens(&free_projects));
    assert_eq!(tokens(&fixture("mod.rs")), tokens(&support));
}
