//! REST Action OpenAPI Generator - Command-line tool for documenting REST actions.
//!
//! Scans a Rust project for types tagged `#[rest_action(..)]`, resolves the request model and
//! response entity each one declares through `RestAction<Model, Response>`, and writes an
//! OpenAPI 3 document together with a Swagger UI page.
//!
//! # Usage
//!
//! ```bash
//! rest-action-openapi [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Document every action of a project:
//! ```bash
//! rest-action-openapi ./shop
//! ```
//!
//! Restrict discovery to one module and write JSON:
//! ```bash
//! rest-action-openapi ./shop -p actions::users -f json -o docs
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! rest-action-openapi ./shop -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use rest_action_openapi::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("REST Action OpenAPI Generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    let summary = cli::run(args)?;

    info!(
        "OpenAPI document generation completed successfully: {}",
        summary.document_path.display()
    );

    Ok(())
}
