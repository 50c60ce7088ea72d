use clap::{Parser, ValueEnum};
use pggen_schema::codegen::{CodeGenerator, TemplateSet};
use pggen_schema::SourceFormatter;
use std::path::PathBuf;

mod catalog;
mod config;
mod error;
mod generate;
mod output;

use catalog::PostgresCatalog;
use config::Config;
use error::GenError;
use generate::Generator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatterArg {
    /// Format generated files with rustfmt
    Rustfmt,
    /// Only check that generated files parse
    SyntaxOnly,
}

impl From<FormatterArg> for SourceFormatter {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::Rustfmt => SourceFormatter::Rustfmt,
            FormatterArg::SyntaxOnly => SourceFormatter::SyntaxOnly,
        }
    }
}

#[derive(Parser)]
#[command(name = "pggen")]
#[command(about = "Generate typed Rust data access modules from a Postgres catalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// The config file path (JSON or YAML)
    #[arg(short, long, default_value = "pggen.json")]
    config: PathBuf,

    /// How generated files are formatted
    #[arg(long, value_enum, default_value_t = FormatterArg::Rustfmt)]
    formatter: FormatterArg,

    /// Directory with table.rs.template, update.rs.template, view.rs.template or support.rs.template overrides
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if let Err(err) = run(cli).await {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from_file(&cli.config)?;

    let templates = match &cli.templates {
        Some(dir) => TemplateSet::from_dir(dir),
        None => TemplateSet::embedded(),
    }
    .map_err(|e| GenError::Configuration(e.to_string()))?;
    let generator = Generator::new(CodeGenerator::new(templates, cli.formatter.into()));

    let mut catalog = PostgresCatalog::connect(&config.dsn).await?;
    // On error the connection is dropped, which closes it.
    let report = generator.run(&config, &mut catalog).await?;
    catalog.close().await?;

    log::info!(
        "Generated {} file(s), ignored {} relation(s)",
        report.written.len(),
        report.ignored.len()
    );
    Ok(())
}
