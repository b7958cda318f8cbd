use crate::config::{Config, CONFIG_FILE_NAME};
use crate::endpoint::ParameterLocation;
use crate::error::Result as LibResult;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::scanner::{ProjectScanner, ScanReport};
use crate::schema_generator::{referenced_schema_names, SchemaGenerator};
use crate::serializer::write_document;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Base name of the generated document
const DOCUMENT_BASE_NAME: &str = "swagger";

/// swag-gen - Generate OpenAPI documentation from swag-style annotations in Go source code
#[derive(Parser, Debug)]
#[command(name = "swag-gen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Go sources to scan (overrides `parser.path` from the config file)
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: Option<PathBuf>,

    /// Output directory (defaults to `output.path` when a config file is given, stdout otherwise)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format [default: json]
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// API title
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,

    /// API version
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// API description
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,

    /// Additional directory name to skip while scanning (repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Maximum number of files parsed concurrently
    #[arg(short = 'j', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server URL added to the document after the base path (repeatable)
    #[arg(long = "server", value_name = "URL")]
    pub servers: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    /// JSON format
    Json,
    /// YAML format
    #[value(alias = "yml")]
    Yaml,
}

impl FormatArg {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// What a generation run produced.
#[derive(Debug)]
pub struct Generation {
    pub document: OpenApiDocument,
    pub report: ScanReport,
    /// Endpoints the document builder rejected
    pub rejected: usize,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(ref config) = args.config {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
        info!("Config file: {}", config.display());
    }
    if let Some(ref path) = args.project_path {
        info!("Project path: {}", path.display());
    }
    match (&args.output_dir, &args.config) {
        (Some(output), _) => info!("Output directory: {}", output.display()),
        (None, Some(_)) => info!("Output directory: from config file"),
        (None, None) => info!("Output: stdout"),
    }

    Ok(args)
}

/// Build the effective configuration: the config file (or defaults) with flags applied on top
pub fn resolve_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(path) = &args.project_path {
        config.set_parser_path(path.to_string_lossy())?;
    }
    if let Some(dir) = &args.output_dir {
        config.set_output_path(dir.to_string_lossy())?;
    }
    if let Some(format) = args.format {
        config.set_output_format(format.as_str())?;
    }
    if let Some(title) = &args.title {
        config.swagger.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        config.swagger.version = version.clone();
    }
    if let Some(description) = &args.description {
        config.swagger.description = description.clone();
    }
    for dir in &args.exclude {
        config.add_exclude_path(dir.as_str());
    }
    if let Some(n) = args.concurrency {
        config.parser.max_concurrent = n;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Scan the configured sources and assemble the document.
///
/// Endpoints are added in (file, line) order so that output does not depend on which worker
/// finished first. Endpoints the builder rejects are logged and counted, not fatal. Struct
/// types referenced by response schemas or body parameters are added to
/// `components.schemas` when their declaration was found.
pub fn generate(config: &Config, extra_servers: &[String]) -> LibResult<Generation> {
    let mut report = ProjectScanner::new(PathBuf::from(&config.parser.path))
        .with_excludes(config.parser.exclude.iter().cloned())
        .with_max_concurrent(config.parser.max_concurrent)
        .scan_project()?;

    report.endpoints.sort_by(|a, b| {
        (&a.source_file, a.source_line, &a.path, &a.method)
            .cmp(&(&b.source_file, b.source_line, &b.path, &b.method))
    });

    let swagger = &config.swagger;
    let description = (!swagger.description.is_empty()).then(|| swagger.description.clone());
    let mut builder = OpenApiBuilder::new(&swagger.title, &swagger.version, description);

    if !swagger.base_path.is_empty() {
        builder.add_server(&swagger.base_path, None);
    }
    for url in extra_servers {
        builder.add_server(url, None);
    }

    let schema_gen = SchemaGenerator::new();
    let mut roots = Vec::new();
    let mut rejected = 0;

    for endpoint in &report.endpoints {
        if let Err(e) = builder.add_endpoint(endpoint) {
            warn!(
                "Skipping endpoint {} {} ({}:{}): {}",
                endpoint.method,
                endpoint.path,
                endpoint.source_file.display(),
                endpoint.source_line,
                e
            );
            rejected += 1;
            continue;
        }

        for response in endpoint.responses.values() {
            if let Some(schema) = &response.schema {
                roots.extend(referenced_schema_names(schema));
            }
        }
        for param in &endpoint.parameters {
            if param.location == ParameterLocation::Body {
                roots.extend(referenced_schema_names(&schema_gen.build_schema(&param.type_name)));
            }
        }
    }

    let mut components = SchemaGenerator::new();
    let unresolved = components.collect_referenced(roots, &report.structs);
    for name in &unresolved {
        debug!("No struct declaration found for {}, leaving $ref unresolved", name);
    }
    for (name, schema) in components.into_schemas() {
        builder.add_schema(&name, schema)?;
    }

    Ok(Generation {
        document: builder.into_document(),
        report,
        rejected,
    })
}

/// Where the document goes: `-o`, then the config file's `output.path`, else stdout
fn output_dir(args: &CliArgs, config: &Config) -> Option<PathBuf> {
    args.output_dir.clone().or_else(|| {
        args.config
            .as_ref()
            .map(|_| PathBuf::from(&config.output.path))
    })
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let config = resolve_config(&args)?;
    info!("Scanning {}", config.parser.path);

    let generation = generate(&config, &args.servers)?;
    let document = &generation.document;

    if generation.report.endpoints.is_empty() {
        warn!("No annotated endpoints found in the project");
    }

    let format = config.output_format();
    info!("Serializing to {} format...", format);

    match output_dir(&args, &config) {
        Some(dir) => {
            let path = write_document(document, &dir, DOCUMENT_BASE_NAME, format)?;
            info!("Successfully wrote OpenAPI document to {}", path.display());

            let config_path = dir.join(CONFIG_FILE_NAME);
            config.save(&config_path)?;
            info!("Configuration written to {}", config_path.display());
        }
        None => {
            println!("{}", format.serialize(document)?);
        }
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", generation.report.files_scanned);
    info!("  - Files skipped: {}", generation.report.failures.len());
    info!("  - Endpoints found: {}", generation.report.endpoints.len());
    info!("  - Endpoints rejected: {}", generation.rejected);
    info!("  - Paths: {}", document.paths.len());

    Ok(())
}
