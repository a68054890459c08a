use crate::config::GeneratorConfig;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// REST Action OpenAPI Generator - Generate OpenAPI documentation for REST actions declared in a Rust project
#[derive(Parser, Debug)]
#[command(name = "rest-action-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// API title (defaults to the artifact id)
    #[arg(long = "title")]
    pub title: Option<String>,

    /// API version (defaults to the package version in Cargo.toml)
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Artifact id used in action paths (defaults to the package name in Cargo.toml)
    #[arg(long = "artifact-id")]
    pub artifact_id: Option<String>,

    /// Module path to search for actions, e.g. `actions::users`; may be repeated.
    /// All modules are searched when none is given.
    #[arg(short = 'p', long = "action-package", value_name = "MODULE")]
    pub action_packages: Vec<String>,

    /// Output directory (defaults to <PROJECT_PATH>/target/classes/apps/<ARTIFACT_ID>/docs)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Name of the document file in the output directory
    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Yaml => "api.yaml",
            OutputFormat::Json => "api.json",
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_parsed: usize,
    pub actions_found: usize,
    pub actions_documented: usize,
    pub actions_skipped: usize,
    pub document_path: PathBuf,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<RunSummary> {
    let config = GeneratorConfig::resolve(&args)?;
    generate(&config)
}

/// Generate the document described by `config` and write it to the output directory
pub fn generate(config: &GeneratorConfig) -> Result<RunSummary> {
    use crate::detector::ActionDetector;
    use crate::openapi_builder::OpenApiBuilder;
    use crate::parser::{AstParser, ParsedFile};
    use crate::scanner::FileScanner;
    use crate::schema_generator::SchemaGenerator;
    use crate::serializer::write_documents;
    use crate::type_resolver::TypeResolver;

    info!("Generating OpenAPI specification file");
    info!("Artifact id: {}", config.artifact_id);
    info!("Output directory: {}", config.output_dir.display());

    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scanner = FileScanner::new(config.project_path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} Rust files", scan_result.rust_files.len());
    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files into AST
    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} files", parsed_files.len());
    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    // Step 3: Index declarations
    info!("Initializing type resolver...");
    let schema_gen = SchemaGenerator::new(TypeResolver::new(&parsed_files));

    // Step 4: Find actions
    let detection = ActionDetector::detect(schema_gen.type_resolver(), &config.action_packages);
    info!("Found {} actions", detection.actions.len());
    if detection.actions.is_empty() {
        warn!("No REST actions found in the project");
    }

    // Step 5: Convert each action, skipping those that cannot be documented
    let mut builder = OpenApiBuilder::new(config.artifact_id.clone())
        .with_info(config.title.clone(), config.version.clone());
    let mut actions_skipped = 0;
    for action in &detection.actions {
        if builder.add_action(action, &schema_gen).is_err() {
            actions_skipped += 1;
        }
    }
    let document = builder.build();
    info!("OpenAPI document built with {} paths", document.paths.len());

    // Step 6: Write api.yaml/api.json and api.html
    let (document_path, _) = write_documents(&document, config.format, &config.output_dir)?;

    let summary = RunSummary {
        files_scanned: scan_result.rust_files.len(),
        files_parsed: parsed_files.len(),
        actions_found: detection.actions.len(),
        actions_documented: detection.actions.len() - actions_skipped,
        actions_skipped,
        document_path,
    };

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", summary.files_scanned);
    info!("  - Files parsed: {}", summary.files_parsed);
    info!("  - Actions found: {}", summary.actions_found);
    info!("  - Actions skipped: {}", summary.actions_skipped);

    Ok(summary)
}
