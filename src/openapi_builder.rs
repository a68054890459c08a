use crate::assembler::{build_form_request_body, build_get_parameters};
use crate::error::SkipReason;
use crate::extractor::{ActionExtractor, HttpMethod, TypeInfo};
use crate::path_builder::build_path;
use crate::responses::build_api_responses;
use crate::schema_generator::{Schema, SchemaGenerator};
use crate::type_resolver::TypeDef;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI version written to generated documents
pub const OPENAPI_VERSION: &str = "3.0.1";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// Artifact id used in every route path
    artifact_id: String,
    /// OpenAPI info section
    info: Info,
    /// Paths collection (URL path -> PathItem), sorted by path
    paths: BTreeMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
}

/// OpenAPI PathItem object. Actions are either GET or POST, so at most one is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Query parameters, left out when there are none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location; always `query` for actions
    #[serde(rename = "in")]
    pub location: String,
    /// `Some(true)` for required parameters, absent otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Parameter schema
    pub schema: Schema,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
}

/// The document fragment produced for one action
#[derive(Debug, Clone, PartialEq)]
pub struct PathOperation {
    pub path: String,
    pub method: HttpMethod,
    pub operation: Operation,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder for `artifact_id`; title defaults to the artifact id
    pub fn new(artifact_id: impl Into<String>) -> Self {
        let artifact_id = artifact_id.into();
        debug!("Initializing OpenApiBuilder for {}", artifact_id);
        Self {
            info: Info {
                title: artifact_id.clone(),
                version: "1.0.0".to_string(),
            },
            artifact_id,
            paths: BTreeMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String) -> Self {
        self.info = Info { title, version };
        self
    }

    /// Convert one action type into its path and operation.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when the type name lacks the `RestAction` suffix, the
    /// model/response types cannot be resolved, or the method is neither GET nor POST.
    pub fn convert(
        &self,
        action: &TypeDef,
        schema_gen: &SchemaGenerator,
    ) -> Result<PathOperation, SkipReason> {
        let path = build_path(&action.name, &self.artifact_id).ok_or_else(|| {
            SkipReason::MissingSuffix {
                type_name: action.qualified_name(),
            }
        })?;

        let descriptor = ActionExtractor::new(schema_gen.type_resolver()).extract(action)?;
        info!(
            "Processing action: {}\n  Request model type:   {}\n  Response entity type: {}",
            descriptor.qualified_name,
            type_name_or_none(&descriptor.request_model),
            type_name_or_none(&descriptor.response_entity)
        );

        let responses = build_api_responses(&descriptor.response_entity, schema_gen);
        let operation = match descriptor.http_method {
            HttpMethod::Get => {
                let parameters = build_get_parameters(&descriptor.request_model, schema_gen);
                Operation {
                    parameters: (!parameters.is_empty()).then_some(parameters),
                    request_body: None,
                    responses,
                }
            }
            HttpMethod::Post => Operation {
                parameters: None,
                request_body: Some(build_form_request_body(&descriptor.request_model, schema_gen)),
                responses,
            },
            method => {
                return Err(SkipReason::UnsupportedMethod {
                    type_name: descriptor.qualified_name,
                    method,
                })
            }
        };

        Ok(PathOperation {
            path,
            method: descriptor.http_method,
            operation,
        })
    }

    /// Convert an action and add it to the document; a skipped action is logged and reported
    pub fn add_action(
        &mut self,
        action: &TypeDef,
        schema_gen: &SchemaGenerator,
    ) -> Result<(), SkipReason> {
        match self.convert(action, schema_gen) {
            Ok(path_operation) => {
                self.add_operation(path_operation);
                Ok(())
            }
            Err(reason) => {
                warn!("{}", reason);
                Err(reason)
            }
        }
    }

    /// Add an operation to the document; a later operation on the same path replaces the earlier one
    pub fn add_operation(&mut self, path_operation: PathOperation) {
        debug!("Adding operation: {} {}", path_operation.method, path_operation.path);

        let item = match path_operation.method {
            HttpMethod::Post => PathItem {
                post: Some(path_operation.operation),
                ..PathItem::default()
            },
            _ => PathItem {
                get: Some(path_operation.operation),
                ..PathItem::default()
            },
        };

        if self.paths.insert(path_operation.path.clone(), item).is_some() {
            warn!(
                "Path {} is produced by more than one action; keeping the last one",
                path_operation.path
            );
        }
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document with {} paths", self.paths.len());

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            paths: self.paths,
        }
    }
}

fn type_name_or_none(type_info: &TypeInfo) -> String {
    if type_info.is_unit() {
        "<none>".to_string()
    } else {
        type_info.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;
    use crate::scanner::SourceFile;
    use crate::type_resolver::TypeResolver;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    /// Helper function to create a SchemaGenerator from code
    fn create_generator_from_code(code: &str) -> SchemaGenerator {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "actions.rs", code);
        let parsed = AstParser::parse_file(&SourceFile {
            path,
            module_path: "actions".to_string(),
        })
        .unwrap();
        SchemaGenerator::new(TypeResolver::new(&[parsed]))
    }

    fn convert(code: &str, action: &str) -> Result<PathOperation, SkipReason> {
        let generator = create_generator_from_code(code);
        let def = generator.type_resolver().find_type(action).unwrap().clone();
        OpenApiBuilder::new("shop").convert(&def, &generator)
    }

    #[test]
    fn test_new_builder() {
        let document = OpenApiBuilder::new("shop").build();

        assert_eq!(document.openapi, "3.0.1");
        assert_eq!(document.info.title, "shop");
        assert!(document.paths.is_empty());
    }

    #[test]
    fn test_with_info() {
        let document = OpenApiBuilder::new("shop")
            .with_info("Shop API".to_string(), "2.0.0".to_string())
            .build();

        assert_eq!(
            document.info,
            Info {
                title: "Shop API".to_string(),
                version: "2.0.0".to_string(),
            }
        );
    }

    #[test]
    fn test_convert_get_action_with_unit_types() {
        let code = r#"
            #[rest_action(GET)]
            pub struct PingRestAction;
            impl RestAction<(), ()> for PingRestAction {}
        "#;

        let path_operation = convert(code, "PingRestAction").unwrap();
        assert_eq!(path_operation.path, "/apps/shop/bin/ping.action");
        assert_eq!(path_operation.method, HttpMethod::Get);
        assert!(path_operation.operation.parameters.is_none());
        assert!(path_operation.operation.request_body.is_none());
        assert_eq!(path_operation.operation.responses.len(), 3);
    }

    #[test]
    fn test_convert_post_action() {
        let code = r#"
            pub struct CreateUserModel {
                #[request_parameter]
                #[not_blank]
                pub name: String,
                #[request_parameter]
                pub age: Option<u32>,
            }

            #[rest_action(POST)]
            pub struct CreateUserRestAction;
            impl RestAction<CreateUserModel, ()> for CreateUserRestAction {}
        "#;

        let path_operation = convert(code, "CreateUserRestAction").unwrap();
        assert_eq!(path_operation.path, "/apps/shop/bin/create-user.action");
        assert!(path_operation.operation.parameters.is_none());

        let body = path_operation.operation.request_body.unwrap();
        let schema = &body.content["multipart/form-data"].schema;
        assert_eq!(schema.required, Some(vec!["name".to_string()]));
    }

    #[test]
    fn test_convert_missing_suffix() {
        let code = r#"
            #[rest_action(GET)]
            pub struct ListUsers;
            impl RestAction<(), ()> for ListUsers {}
        "#;

        assert_eq!(
            convert(code, "ListUsers"),
            Err(SkipReason::MissingSuffix {
                type_name: "actions::ListUsers".to_string(),
            })
        );
    }

    #[test]
    fn test_convert_unsupported_method() {
        let code = r#"
            #[rest_action(DELETE)]
            pub struct DeleteUserRestAction;
            impl RestAction<(), ()> for DeleteUserRestAction {}
        "#;

        assert_eq!(
            convert(code, "DeleteUserRestAction"),
            Err(SkipReason::UnsupportedMethod {
                type_name: "actions::DeleteUserRestAction".to_string(),
                method: HttpMethod::Delete,
            })
        );
    }

    #[test]
    fn test_add_action_collects_paths_in_order() {
        let code = r#"
            #[rest_action(GET)]
            pub struct ZetaRestAction;
            impl RestAction<(), String> for ZetaRestAction {}

            #[rest_action(POST)]
            pub struct AlphaRestAction;
            impl RestAction<(), ()> for AlphaRestAction {}

            #[rest_action(GET)]
            pub struct Broken;
        "#;

        let generator = create_generator_from_code(code);
        let mut builder = OpenApiBuilder::new("shop");
        for name in ["ZetaRestAction", "AlphaRestAction", "Broken"] {
            let def = generator.type_resolver().find_type(name).unwrap();
            let _ = builder.add_action(def, &generator);
        }

        let document = builder.build();
        let paths: Vec<&str> = document.paths.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec!["/apps/shop/bin/alpha.action", "/apps/shop/bin/zeta.action"]
        );
        assert!(document.paths["/apps/shop/bin/alpha.action"].post.is_some());
        assert!(document.paths["/apps/shop/bin/alpha.action"].get.is_none());
    }

    #[test]
    fn test_add_operation_replaces_duplicate_path() {
        let mut builder = OpenApiBuilder::new("shop");
        let operation = Operation {
            parameters: None,
            request_body: None,
            responses: BTreeMap::new(),
        };

        builder.add_operation(PathOperation {
            path: "/apps/shop/bin/x.action".to_string(),
            method: HttpMethod::Get,
            operation: operation.clone(),
        });
        builder.add_operation(PathOperation {
            path: "/apps/shop/bin/x.action".to_string(),
            method: HttpMethod::Post,
            operation,
        });

        let document = builder.build();
        let item = &document.paths["/apps/shop/bin/x.action"];
        assert!(item.get.is_none());
        assert!(item.post.is_some());
    }

    #[test]
    fn test_type_name_or_none() {
        assert_eq!(type_name_or_none(&TypeInfo::unit()), "<none>");
        assert_eq!(
            type_name_or_none(&TypeInfo::generic("Vec", vec![TypeInfo::new("User")])),
            "Vec<User>"
        );
    }

    #[test]
    fn test_models_with_same_name_in_different_modules() {
        let module = |module_path: &str, code: &str| crate::parser::ParsedFile {
            path: std::path::PathBuf::from(format!("{}.rs", module_path)),
            module_path: module_path.to_string(),
            syntax_tree: syn::parse_file(code).unwrap(),
        };
        let generator = SchemaGenerator::new(TypeResolver::new(&[
            module(
                "users",
                r#"
                    pub struct Model {
                        #[request_parameter]
                        pub user_name: String,
                    }

                    #[rest_action(GET)]
                    pub struct ListUsersRestAction;
                    impl RestAction<Model, ()> for ListUsersRestAction {}
                "#,
            ),
            module(
                "orders",
                r#"
                    pub struct Model {
                        #[request_parameter]
                        pub order_id: u64,
                    }

                    #[rest_action(GET)]
                    pub struct ListOrdersRestAction;
                    impl RestAction<Model, ()> for ListOrdersRestAction {}
                "#,
            ),
        ]));

        let parameter_names = |action: &str| -> Vec<String> {
            let def = generator.type_resolver().find_type(action).unwrap();
            OpenApiBuilder::new("shop")
                .convert(def, &generator)
                .unwrap()
                .operation
                .parameters
                .unwrap_or_default()
                .into_iter()
                .map(|parameter| parameter.name)
                .collect()
        };

        assert_eq!(parameter_names("ListOrdersRestAction"), vec!["order_id"]);
        assert_eq!(parameter_names("ListUsersRestAction"), vec!["user_name"]);
    }
}
