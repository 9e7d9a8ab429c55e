use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use tabletypes::codegen::{CodeGenConfig, CodeGenerator, DefinitionEmitter, JavaGenerator};
use tabletypes::config::GenConfig;
use tabletypes::customize::Customizations;
use tabletypes::metadata::SchemaMetadata;
use tabletypes::naming::{FieldNameStyle, NamingStyle, ParamStyle};

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
enum CliNamingStyle {
    /// Identifier used verbatim
    AsIs,
    /// First character upper-cased
    CapitalizeWhole,
    /// Each underscore-separated part capitalized, underscores removed
    CapitalizeEachPart,
    /// UpperCamelCase
    UpperCamelCase,
}

impl From<CliNamingStyle> for NamingStyle {
    fn from(style: CliNamingStyle) -> Self {
        match style {
            CliNamingStyle::AsIs => NamingStyle::AsIs,
            CliNamingStyle::CapitalizeWhole => NamingStyle::CapitalizeWhole,
            CliNamingStyle::CapitalizeEachPart => NamingStyle::CapitalizeEachPart,
            CliNamingStyle::UpperCamelCase => NamingStyle::UpperCamelCase,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
enum CliFieldNameStyle {
    /// Column name used verbatim
    AsIs,
    /// lowerCamelCase
    LowerCamelCase,
    /// UpperCamelCase
    UpperCamelCase,
}

impl From<CliFieldNameStyle> for FieldNameStyle {
    fn from(style: CliFieldNameStyle) -> Self {
        match style {
            CliFieldNameStyle::AsIs => FieldNameStyle::AsIs,
            CliFieldNameStyle::LowerCamelCase => FieldNameStyle::LowerCamelCase,
            CliFieldNameStyle::UpperCamelCase => FieldNameStyle::UpperCamelCase,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
enum CliParamStyle {
    /// :column_name
    AsIs,
    /// :columnName
    CamelCase,
    /// ?
    QuestionMark,
    /// $1, $2, ...
    DollarNumber,
}

impl From<CliParamStyle> for ParamStyle {
    fn from(style: CliParamStyle) -> Self {
        match style {
            CliParamStyle::AsIs => ParamStyle::AsIs,
            CliParamStyle::CamelCase => ParamStyle::CamelCase,
            CliParamStyle::QuestionMark => ParamStyle::QuestionMark,
            CliParamStyle::DollarNumber => ParamStyle::DollarNumber,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tabletypes")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database metadata JSON file, as produced by the introspection query
    metadata_file: PathBuf,

    /// Base source directory (e.g. src/main/java)
    output: PathBuf,

    /// Package of the generated sources [env: TABLETYPES_PACKAGE]
    #[arg(short, long)]
    package: Option<String>,

    /// JSON file of per-field customizations
    #[arg(long)]
    customization_file: Option<PathBuf>,

    /// Naming style for schema class names
    #[arg(long, value_enum)]
    schema_name_style: Option<CliNamingStyle>,

    /// Naming style for table record names
    #[arg(long, value_enum)]
    table_name_style: Option<CliNamingStyle>,

    /// Naming style for user-defined type names
    #[arg(long, value_enum)]
    type_name_style: Option<CliNamingStyle>,

    /// Naming style for record components
    #[arg(long, value_enum)]
    field_name_style: Option<CliFieldNameStyle>,

    /// Parameter style in generated insert SQL
    #[arg(long, value_enum)]
    param_style: Option<CliParamStyle>,

    /// Prefix for schema class names (avoids clashes with Java keywords)
    #[arg(long)]
    schema_class_prefix: Option<String>,

    /// Suffix for insert-only record names
    #[arg(long)]
    insert_suffix: Option<String>,

    /// Path to .env file for generation options
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("tabletypes v{}", env!("CARGO_PKG_VERSION"));
    info!(
        metadata = ?cli.metadata_file,
        output = ?cli.output,
        customizations = ?cli.customization_file,
        "Starting code generation"
    );

    let config = build_config(&cli)?;
    config.validate().context("Invalid configuration")?;
    debug!(config = ?config, "Generation config");

    let metadata_json = fs::read_to_string(&cli.metadata_file).with_context(|| {
        format!(
            "Failed to read metadata file {}",
            cli.metadata_file.display()
        )
    })?;
    let metadata = SchemaMetadata::from_json(&metadata_json).with_context(|| {
        format!(
            "Failed to parse metadata file {}",
            cli.metadata_file.display()
        )
    })?;

    info!(
        dbms = ?metadata.dbms_name,
        version = ?metadata.dbms_version,
        relations = metadata.relation_metadatas.len(),
        foreign_keys = metadata.foreign_keys.len(),
        enums = metadata.enum_types.len(),
        "Loaded database metadata"
    );

    let customizations = load_customizations(&cli)?;
    customizations.warn_unmatched(&metadata);

    let units = DefinitionEmitter::new(&config, &customizations)
        .emit(&metadata)
        .context("Failed to generate definitions")?;

    for unit in &units {
        debug!(
            schema = ?unit.schema,
            class = ?unit.class_name,
            definitions = unit.definitions.len(),
            "Schema unit"
        );
    }

    let codegen_config = CodeGenConfig::new(cli.output.clone(), config.package()?);
    debug!(codegen_config = ?codegen_config, "Code generation config");

    JavaGenerator::new()
        .generate(&units, &codegen_config)
        .context("Failed to write generated sources")?;

    Ok(())
}

/// Environment configuration with command-line overrides applied
fn build_config(cli: &Cli) -> Result<GenConfig> {
    let mut config = GenConfig::load(&cli.env_file).context("Failed to load configuration")?;

    if let Some(package) = &cli.package {
        config = config.with_package(package.clone());
    }
    if let Some(style) = cli.schema_name_style {
        config = config.with_schema_style(style.into());
    }
    if let Some(style) = cli.table_name_style {
        config = config.with_table_style(style.into());
    }
    if let Some(style) = cli.type_name_style {
        config = config.with_type_style(style.into());
    }
    if let Some(style) = cli.field_name_style {
        config = config.with_field_style(style.into());
    }
    if let Some(style) = cli.param_style {
        config = config.with_param_style(style.into());
    }
    if let Some(prefix) = &cli.schema_class_prefix {
        config = config.with_schema_class_prefix(prefix.clone());
    }
    if let Some(suffix) = &cli.insert_suffix {
        config = config.with_insert_suffix(suffix.clone());
    }

    Ok(config)
}

fn load_customizations(cli: &Cli) -> Result<Customizations> {
    let Some(path) = &cli.customization_file else {
        return Ok(Customizations::empty());
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read customization file {}", path.display()))?;
    let customizations = Customizations::from_json(&json)
        .with_context(|| format!("Failed to load customization file {}", path.display()))?;

    info!(count = customizations.len(), "Loaded field customizations");
    Ok(customizations)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}
