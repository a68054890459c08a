use crate::scanner::SourceFile;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into an abstract syntax tree,
/// from which the type resolver indexes declarations.
///
/// # Example
///
/// ```no_run
/// use rest_action_openapi::parser::AstParser;
/// use rest_action_openapi::scanner::SourceFile;
/// use std::path::PathBuf;
///
/// let source = SourceFile {
///     path: PathBuf::from("src/lib.rs"),
///     module_path: String::new(),
/// };
/// let parsed = AstParser::parse_file(&source).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module the file defines; prefixes the qualified names of its declarations
    pub module_path: String,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Arguments
    ///
    /// * `source` - The source file to parse
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(source: &SourceFile) -> Result<ParsedFile> {
        let path = &source.path;
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.clone(),
            module_path: source.module_path.clone(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues for remaining
    /// files, so a document can still be produced when some files have syntax errors.
    ///
    /// # Returns
    ///
    /// One `Result<ParsedFile>` per input, in input order.
    pub fn parse_files(sources: &[SourceFile]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", sources.len());

        let results: Vec<Result<ParsedFile>> = sources
            .iter()
            .map(|source| {
                Self::parse_file(source).inspect_err(|e| {
                    warn!("Failed to parse {}: {}", source.path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
