//! Request side of an operation: query parameters for GET, a multipart form for POST.

use crate::extractor::TypeInfo;
use crate::openapi_builder::{MediaType, Parameter, RequestBody};
use crate::schema_generator::{Schema, SchemaGenerator};
use crate::type_resolver::{FieldDef, TypeResolver};
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

/// Field tag marking a request model field as a request parameter
pub const REQUEST_PARAMETER_TAG: &str = "request_parameter";

/// Raw upload type; fields of this type are request parameters without being tagged
pub const RAW_UPLOAD_TYPE: &str = "RequestParameter";

/// Field tags that make a parameter mandatory
pub const REQUIRED_TAGS: &[&str] = &["not_blank", "not_empty", "not_null"];

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// A request model field that maps to a request parameter
#[derive(Debug, Clone)]
pub struct ModelField {
    pub field: FieldDef,
    /// Declared type with the model's type arguments filled in
    pub type_info: TypeInfo,
}

impl ModelField {
    /// `Some(true)` when a required tag is present, otherwise `None`; never `Some(false)`
    pub fn is_required(&self) -> Option<bool> {
        REQUIRED_TAGS
            .iter()
            .any(|tag| self.field.has_tag(tag))
            .then_some(true)
    }

    /// The explicit `#[request_parameter(name = "..")]` name, else the field name
    pub fn parameter_name(&self) -> &str {
        self.field
            .parameter_name
            .as_deref()
            .unwrap_or(&self.field.name)
    }

    fn is_upload(&self, type_resolver: &TypeResolver) -> bool {
        let normalized = type_resolver.normalize(&self.type_info);
        !normalized.is_array && normalized.simple_name() == RAW_UPLOAD_TYPE
    }
}

/// Request parameter fields of `model`, in declaration order.
///
/// Fields of `#[serde(flatten)]` members are included in place. The unit model and models
/// that do not resolve to a struct have no fields.
pub fn model_fields(model: &TypeInfo, type_resolver: &TypeResolver) -> Vec<ModelField> {
    let mut fields = Vec::new();
    let mut visited = HashSet::new();
    collect_model_fields(model, type_resolver, &mut visited, &mut fields);
    fields
}

fn collect_model_fields(
    model: &TypeInfo,
    type_resolver: &TypeResolver,
    visited: &mut HashSet<String>,
    fields: &mut Vec<ModelField>,
) {
    let model = type_resolver.normalize(model);
    if model.is_unit() {
        return;
    }
    let Some((def, struct_def, bindings)) = type_resolver.resolve_struct(&model) else {
        debug!("Request model {} has no fields", model);
        return;
    };
    // Flattening re-enters a declaration at most once, whatever its type arguments
    if !visited.insert(def.qualified_name()) {
        debug!("Skipping {}, already flattened into the request model", model);
        return;
    }

    for field in &struct_def.fields {
        let type_info = TypeResolver::substitute(&field.type_info, &bindings);
        if field.serde_attrs.flatten {
            collect_model_fields(&type_info, type_resolver, visited, fields);
            continue;
        }

        let model_field = ModelField {
            field: field.clone(),
            type_info,
        };
        if model_field.field.has_tag(REQUEST_PARAMETER_TAG) || model_field.is_upload(type_resolver) {
            fields.push(model_field);
        }
    }
}

/// One query parameter per request parameter field of `model`
pub fn build_get_parameters(model: &TypeInfo, schema_gen: &SchemaGenerator) -> Vec<Parameter> {
    model_fields(model, schema_gen.type_resolver())
        .into_iter()
        .map(|model_field| {
            let required = model_field.is_required();
            let schema = schema_gen
                .generate_parameter_schema(&model_field.type_info, required.unwrap_or(false))
                .unwrap_or_else(Schema::object);
            Parameter {
                name: model_field.parameter_name().to_string(),
                location: "query".to_string(),
                required,
                schema,
            }
        })
        .collect()
}

/// A `multipart/form-data` body with one property per request parameter field of `model`.
///
/// Upload fields are binary and keyed by the field name itself.
pub fn build_form_request_body(model: &TypeInfo, schema_gen: &SchemaGenerator) -> RequestBody {
    let type_resolver = schema_gen.type_resolver();
    let mut properties = IndexMap::new();
    let mut required_names = Vec::new();

    for model_field in model_fields(model, type_resolver) {
        if model_field.is_upload(type_resolver) {
            properties.insert(model_field.field.name.clone(), Schema::binary());
            continue;
        }

        let required = model_field.is_required();
        let name = model_field.parameter_name().to_string();
        let schema = schema_gen
            .generate_parameter_schema(&model_field.type_info, required.unwrap_or(false))
            .unwrap_or_else(Schema::object);
        if required == Some(true) {
            required_names.push(name.clone());
        }
        properties.insert(name, schema);
    }

    RequestBody {
        content: IndexMap::from([(
            MULTIPART_FORM_DATA.to_string(),
            MediaType {
                schema: Schema::object_with(properties).with_required(required_names),
            },
        )]),
    }
}
