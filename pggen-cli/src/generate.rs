//! Generation run: catalog relations in, one module per relation plus a
//! support module per schema out

use crate::catalog::CatalogSource;
use crate::config::{Config, SchemaConfig};
use crate::error::{GenError, Result};
use crate::output;
use indexmap::IndexMap;
use pggen_schema::codegen::{module_file_name, CodeGenerator, GeneratedModule};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SUPPORT_FILE: &str = "mod.rs";

/// Files written and relations skipped during a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub ignored: Vec<String>,
}

/// Modules generated into one output directory, from one or more schemas
struct OutputPackage {
    package: String,
    modules: Vec<GeneratedModule>,
    /// Module file name to the `schema.relation` it was generated for
    files: HashMap<String, String>,
}

impl OutputPackage {
    fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            modules: Vec::new(),
            files: HashMap::new(),
        }
    }
}

pub struct Generator {
    codegen: CodeGenerator,
}

impl Generator {
    pub fn new(codegen: CodeGenerator) -> Self {
        Self { codegen }
    }

    /// Generate every configured schema in declaration order, stopping at the
    /// first error
    ///
    /// Each output directory gets a single `mod.rs`, written once every
    /// schema has been generated, declaring the modules of all schemas that
    /// share it.
    pub async fn run(
        &self,
        config: &Config,
        catalog: &mut dyn CatalogSource,
    ) -> Result<GenerationReport> {
        log::info!("Generating code for tables and views");

        let mut report = GenerationReport::default();
        let mut packages: IndexMap<PathBuf, OutputPackage> = IndexMap::new();
        for (name, schema) in &config.schemas {
            self.generate_schema(name, schema, catalog, &mut packages, &mut report)
                .await?;
        }

        for (dest, package) in &packages {
            self.write_support(dest, package, &mut report).await?;
        }
        Ok(report)
    }

    async fn generate_schema(
        &self,
        name: &str,
        schema: &SchemaConfig,
        catalog: &mut dyn CatalogSource,
        packages: &mut IndexMap<PathBuf, OutputPackage>,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let output = schema.output.as_ref().ok_or_else(|| {
            GenError::Configuration(format!("$.schemas.{}.output must be present", name))
        })?;
        let options = output.generation_options();

        log::info!("Generating code for schema [{}]", name);
        let relations = catalog.relations(name, schema.include_views).await?;

        output::ensure_dir(&output.dest).await?;

        let package = packages
            .entry(output.dest.clone())
            .or_insert_with(|| OutputPackage::new(&options.package));
        if package.package != options.package {
            return Err(GenError::Configuration(format!(
                "$.schemas.{}.output.package must be [{}] to share dest [{}]",
                name,
                package.package,
                output.dest.display()
            )));
        }

        for table in &relations {
            if schema.should_ignore(&table.name) {
                log::info!("- Ignored code generation for {} [{}]", table.kind, table.name);
                report.ignored.push(table.name.clone());
                continue;
            }

            let file_name = module_file_name(&table.name);
            let qualified = format!("{}.{}", name, table.name);
            if let Some(previous) = package.files.insert(file_name.clone(), qualified) {
                return Err(GenError::Generation {
                    kind: table.kind.to_string(),
                    relation: table.name.clone(),
                    message: format!(
                        "module file [{}] is already generated for [{}]",
                        file_name, previous
                    ),
                });
            }

            let code = self
                .codegen
                .generate_relation(table, &options)
                .map_err(|e| GenError::generation(table.kind, &table.name, e))?;

            let path = output.dest.join(&file_name);
            output::write_file(&path, &code).await?;
            log::info!(
                "- Generated [{}] for {} [{}]",
                path.display(),
                table.kind,
                table.name
            );

            package.modules.push(GeneratedModule::for_table(table));
            report.written.push(path);
        }

        Ok(())
    }

    async fn write_support(
        &self,
        dest: &Path,
        package: &OutputPackage,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let support = self
            .codegen
            .generate_support(&package.package, &package.modules)
            .map_err(|e| GenError::generation("package", &package.package, e))?;

        let path = dest.join(SUPPORT_FILE);
        output::write_file(&path, &support).await?;
        log::info!(
            "- Generated [{}] for package [{}]",
            path.display(),
            package.package
        );
        report.written.push(path);
        Ok(())
    }
}
