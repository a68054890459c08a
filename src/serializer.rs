//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats,
//! render the companion Swagger UI page and write both into the output directory.

use crate::cli::OutputFormat;
use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Swagger UI page written next to the document
const API_PAGE_TEMPLATE: &str = include_str!("../assets/api.html");

/// File name of the companion page
pub const API_PAGE_FILE: &str = "api.html";

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use rest_action_openapi::openapi_builder::OpenApiBuilder;
/// use rest_action_openapi::serializer::serialize_yaml;
///
/// let doc = OpenApiBuilder::new("shop").build();
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.contains("openapi: 3.0.1"));
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Serializes an OpenAPI document in the requested format
pub fn serialize(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(doc),
        OutputFormat::Json => serialize_json(doc),
    }
}

/// Render the Swagger UI page for `title`, loading the document from `document_file`
pub fn render_api_page(title: &str, document_file: &str) -> String {
    API_PAGE_TEMPLATE
        .replace("${title}", title)
        .replace("${url}", document_file)
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Write the document (`api.yaml` or `api.json`) and `api.html` into `output_dir`.
///
/// Both files are first written under temporary names and then renamed into place. When
/// either step fails, the files written by this call are removed again, so a failed run
/// never leaves a document without its page.
///
/// # Returns
///
/// The paths of the document and the page, in that order.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be written.
pub fn write_documents(
    doc: &OpenApiDocument,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Could not create output directory: {}", output_dir.display())
    })?;

    let document_path = output_dir.join(format.file_name());
    let page_path = output_dir.join(API_PAGE_FILE);
    let staged_document = staging_path(&document_path);
    let staged_page = staging_path(&page_path);

    let content = serialize(doc, format)?;
    let page = render_api_page(&doc.info.title, format.file_name());
    let staged = write_to_file(&content, &staged_document)
        .context("Error while saving OpenAPI specification file")
        .and_then(|()| {
            write_to_file(&page, &staged_page).context("Could not save API HTML file")
        });
    if let Err(e) = staged {
        discard(&[staged_document.as_path(), staged_page.as_path()]);
        return Err(e);
    }

    if let Err(e) = fs::rename(&staged_document, &document_path) {
        discard(&[staged_document.as_path(), staged_page.as_path()]);
        return Err(e).with_context(|| {
            format!(
                "Error while saving OpenAPI specification file: {}",
                document_path.display()
            )
        });
    }
    info!("OpenAPI specification saved to {}", document_path.display());

    if let Err(e) = fs::rename(&staged_page, &page_path) {
        discard(&[staged_page.as_path(), document_path.as_path()]);
        return Err(e)
            .with_context(|| format!("Could not save API HTML file: {}", page_path.display()));
    }
    debug!("API page saved to {}", page_path.display());

    Ok((document_path, page_path))
}

/// `dir/.name.tmp` next to `path`
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Remove files left by a failed write; missing files are fine
fn discard(paths: &[&Path]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!("Could not remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::{Info, OpenApiDocument, OpenApiBuilder};
    use crate::schema_generator::SchemaGenerator;
    use crate::type_resolver::TypeResolver;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    /// Helper function to create a minimal OpenAPI document for testing
    fn create_test_document() -> OpenApiDocument {
        OpenApiDocument {
            openapi: "3.0.1".to_string(),
            info: Info {
                title: "Test API".to_string(),
                version: "1.0.0".to_string(),
            },
            paths: BTreeMap::new(),
        }
    }

    /// A document with one GET action returning a string
    fn create_action_document() -> OpenApiDocument {
        let code = r#"
            pub struct Filter {
                #[request_parameter]
                pub limit: Option<u32>,
            }

            #[rest_action(GET)]
            pub struct ListNamesRestAction;
            impl RestAction<Filter, Vec<String>> for ListNamesRestAction {}
        "#;
        let parsed = crate::parser::ParsedFile {
            path: PathBuf::from("actions.rs"),
            module_path: "actions".to_string(),
            syntax_tree: syn::parse_file(code).unwrap(),
        };
        let schema_gen = SchemaGenerator::new(TypeResolver::new(&[parsed]));
        let mut builder = OpenApiBuilder::new("shop");
        let action = schema_gen
            .type_resolver()
            .find_type("ListNamesRestAction")
            .unwrap();
        builder.add_action(action, &schema_gen).unwrap();
        builder.build()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi: 3.0.1"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("version: 1.0.0"));
        assert!(yaml.contains("paths: {}"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.1");
        assert_eq!(parsed["info"]["title"], "Test API");
    }

    #[test]
    fn test_serialize_action_document_leaves_out_absent_flags() {
        let doc = create_action_document();
        let json: serde_json::Value = serde_json::from_str(&serialize_json(&doc).unwrap()).unwrap();

        let get = &json["paths"]["/apps/shop/bin/list-names.action"]["get"];
        let parameter = &get["parameters"][0];
        assert_eq!(parameter["name"], "limit");
        assert_eq!(parameter["in"], "query");
        assert!(parameter.get("required").is_none());
        assert_eq!(parameter["schema"]["nullable"], true);

        let entity = &get["responses"]["200"]["content"]["application/json"]["schema"]["properties"]["entity"];
        assert_eq!(entity["type"], "array");
        assert_eq!(entity["items"]["type"], "string");
        assert!(get.get("requestBody").is_none());
    }

    #[test]
    fn test_yaml_keeps_property_order() {
        let yaml = serialize_yaml(&create_action_document()).unwrap();

        let status = yaml.find("status:").unwrap();
        let message = yaml.find("message:").unwrap();
        let details = yaml.find("messageDetails:").unwrap();
        let auth = yaml.find("authContext:").unwrap();
        assert!(status < message && message < details && details < auth);
    }

    #[test]
    fn test_roundtrip_yaml_serialization() {
        let doc = create_action_document();
        let yaml = serialize_yaml(&doc).unwrap();

        let deserialized: OpenApiDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(deserialized, doc);
    }

    #[test]
    fn test_render_api_page() {
        let page = render_api_page("Shop API", "api.yaml");

        assert!(page.contains("<title>Shop API</title>"));
        assert!(page.contains("url: \"api.yaml\""));
        assert!(!page.contains("${"));
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("test.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_write_documents() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("docs");

        let (document_path, page_path) =
            write_documents(&create_test_document(), OutputFormat::Yaml, &output_dir).unwrap();

        assert_eq!(document_path, output_dir.join("api.yaml"));
        assert_eq!(page_path, output_dir.join("api.html"));

        let content = fs::read_to_string(&document_path).unwrap();
        let deserialized: OpenApiDocument = serde_yaml::from_str(&content).unwrap();
        assert_eq!(deserialized.info.title, "Test API");

        let page = fs::read_to_string(&page_path).unwrap();
        assert!(page.contains("<title>Test API</title>"));
    }

    #[test]
    fn test_write_documents_json() {
        let temp_dir = TempDir::new().unwrap();

        let (document_path, page_path) =
            write_documents(&create_test_document(), OutputFormat::Json, temp_dir.path()).unwrap();

        assert_eq!(document_path, temp_dir.path().join("api.json"));
        assert!(fs::read_to_string(page_path).unwrap().contains("api.json"));
    }

    #[test]
    fn test_write_documents_fails_on_file_in_place_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("docs");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_documents(&create_test_document(), OutputFormat::Yaml, &blocker)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Could not create output directory"));
    }

    #[test]
    fn test_failed_page_write_leaves_no_document() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path();
        // A non-empty directory where the page should go cannot be replaced by a file
        fs::create_dir_all(output_dir.join("api.html").join("occupied")).unwrap();

        let err = write_documents(&create_test_document(), OutputFormat::Yaml, output_dir)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Could not save API HTML file"));

        assert!(!output_dir.join("api.yaml").exists());
        assert!(!output_dir.join(".api.yaml.tmp").exists());
        assert!(!output_dir.join(".api.html.tmp").exists());
        assert!(output_dir.join("api.html").join("occupied").is_dir());
    }

    #[test]
    fn test_write_documents_replaces_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path();
        fs::write(output_dir.join("api.yaml"), "stale").unwrap();

        let (document_path, _) =
            write_documents(&create_test_document(), OutputFormat::Yaml, output_dir).unwrap();

        assert!(fs::read_to_string(document_path).unwrap().contains("openapi: 3.0.1"));
        assert!(!output_dir.join(".api.yaml.tmp").exists());
    }
}
