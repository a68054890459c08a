//! REST Action OpenAPI Generator - Automatic OpenAPI documentation for REST action handlers.
//!
//! This library generates an OpenAPI 3.0.1 document by statically analyzing Rust source code.
//! A REST action is a type tagged `#[rest_action(GET)]` or `#[rest_action(method = "POST")]`
//! that implements `RestAction<Model, Response>`, directly or through a chain of traits.
//! Each action becomes one path; its model becomes query parameters (GET) or a multipart
//! form body (POST), and its response entity is wrapped in the standard result envelope.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into Abstract Syntax Trees (AST)
//! 3. [`type_resolver`] - Indexes type, trait and impl declarations
//! 4. [`detector`] - Finds action types, optionally restricted to action packages
//! 5. [`extractor`] - Reads an action's HTTP method, model and response entity
//! 6. [`classifier`] - Decides which schema shape a Rust type maps to
//! 7. [`schema_generator`] - Converts Rust types to OpenAPI schemas
//! 8. [`path_builder`] - Derives the route path from an action's name
//! 9. [`assembler`] - Builds query parameters and form bodies from a model
//! 10. [`responses`] - Builds the 200/400/500 responses
//! 11. [`openapi_builder`] - Constructs the complete OpenAPI document
//! 12. [`serializer`] - Serializes the document and writes the Swagger UI page
//!
//! # Example Usage
//!
//! ```no_run
//! use rest_action_openapi::{
//!     scanner::FileScanner,
//!     parser::AstParser,
//!     detector::ActionDetector,
//!     type_resolver::TypeResolver,
//!     schema_generator::SchemaGenerator,
//!     openapi_builder::OpenApiBuilder,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! // Scan project directory
//! let scanner = FileScanner::new(PathBuf::from("./my-project"));
//! let scan_result = scanner.scan().unwrap();
//!
//! // Parse files
//! let parse_results = AstParser::parse_files(&scan_result.rust_files);
//! let parsed_files: Vec<_> = parse_results.into_iter().filter_map(Result::ok).collect();
//!
//! // Index declarations and find actions
//! let schema_gen = SchemaGenerator::new(TypeResolver::new(&parsed_files));
//! let detection = ActionDetector::detect(schema_gen.type_resolver(), &[]);
//!
//! // Build OpenAPI document; actions that cannot be documented are skipped
//! let mut builder = OpenApiBuilder::new("my-project");
//! for action in &detection.actions {
//!     let _ = builder.add_action(action, &schema_gen);
//! }
//! let document = builder.build();
//!
//! // Serialize to YAML
//! let yaml = serialize_yaml(&document).unwrap();
//! println!("{}", yaml);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod scanner;
pub mod parser;
pub mod detector;
pub mod extractor;
pub mod type_resolver;
pub mod classifier;
pub mod schema_generator;
pub mod path_builder;
pub mod assembler;
pub mod responses;
pub mod openapi_builder;
pub mod serializer;
pub mod error;
