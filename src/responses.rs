//! The fixed response contract of REST actions.
//!
//! Every action answers with a result envelope:
//!
//! ```yaml
//! entity: ...          # 200 only, when the action returns something
//! status: SUCCESS      # or VALIDATION_FAILURE / ERROR
//! message: string
//! messageDetails: string
//! authContext: { userId: string }
//! ```
//!
//! Actions returning [`FREE_FORM_RESPONSE`] write arbitrary bytes instead and only get a
//! binary 200 response.

use crate::extractor::TypeInfo;
use crate::openapi_builder::{MediaType, Response};
use crate::schema_generator::{Schema, SchemaGenerator};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Response type of actions that write their own body
pub const FREE_FORM_RESPONSE: &str = "FreeFormResponse";

pub const APPLICATION_JSON: &str = "application/json";
pub const ANY_CONTENT: &str = "*/*";

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_VALIDATION_FAILURE: &str = "VALIDATION_FAILURE";
pub const STATUS_ERROR: &str = "ERROR";

/// The result envelope with the given `status` and optional `entity`
pub fn result_envelope(status: &str, entity: Option<Schema>) -> Schema {
    let mut properties = IndexMap::new();
    if let Some(entity) = entity {
        properties.insert("entity".to_string(), entity);
    }
    properties.insert("status".to_string(), Schema::enumeration([status]));
    properties.insert("message".to_string(), Schema::string());
    properties.insert("messageDetails".to_string(), Schema::string());
    properties.insert(
        "authContext".to_string(),
        Schema::object_with(IndexMap::from([("userId".to_string(), Schema::string())])),
    );
    Schema::object_with(properties)
}

fn json_response(description: &str, schema: Schema) -> Response {
    Response {
        description: Some(description.to_string()),
        content: Some(IndexMap::from([(
            APPLICATION_JSON.to_string(),
            MediaType { schema },
        )])),
    }
}

/// 200 "OK", carrying `entity` when there is one
pub fn success_response(entity: Option<Schema>) -> Response {
    json_response("OK", result_envelope(STATUS_SUCCESS, entity))
}

/// 400 "Validation failure", listing the rejected values
pub fn validation_failure_response() -> Response {
    let violation = Schema::object_with(IndexMap::from([
        ("path".to_string(), Schema::string()),
        ("invalidValue".to_string(), Schema::object()),
        ("message".to_string(), Schema::string()),
    ]));
    json_response(
        "Validation failure",
        result_envelope(STATUS_VALIDATION_FAILURE, Some(Schema::array(violation))),
    )
}

/// 500 "Unexpected server error"
pub fn error_response() -> Response {
    json_response("Unexpected server error", result_envelope(STATUS_ERROR, None))
}

/// 200 with any content type and a binary body
pub fn free_form_response() -> Response {
    Response {
        description: None,
        content: Some(IndexMap::from([(
            ANY_CONTENT.to_string(),
            MediaType {
                schema: Schema::binary(),
            },
        )])),
    }
}

/// Whether the action writes its own response body
pub fn is_free_form(response_entity: &TypeInfo, schema_gen: &SchemaGenerator) -> bool {
    let normalized = schema_gen.type_resolver().normalize(response_entity);
    !normalized.is_array && normalized.simple_name() == FREE_FORM_RESPONSE
}

/// Responses of an action returning `response_entity`, keyed by status code.
///
/// Free-form actions only document the 200 response; there is no predictable error shape for them.
pub fn build_api_responses(
    response_entity: &TypeInfo,
    schema_gen: &SchemaGenerator,
) -> BTreeMap<String, Response> {
    if is_free_form(response_entity, schema_gen) {
        return BTreeMap::from([("200".to_string(), free_form_response())]);
    }

    let entity = schema_gen.generate_response_schema(response_entity);
    BTreeMap::from([
        ("200".to_string(), success_response(entity)),
        ("400".to_string(), validation_failure_response()),
        ("500".to_string(), error_response()),
    ])
}
