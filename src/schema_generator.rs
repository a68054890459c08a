use crate::classifier::{classify, SchemaKind};
use crate::extractor::TypeInfo;
use crate::type_resolver::{TypeKind, TypeResolver};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Schema generator - converts Rust types to inline OpenAPI schemas
///
/// Every schema is written out in full at the point of use; nothing is registered under
/// `components`. A type that re-enters itself is cut off with an untyped object leaf.
pub struct SchemaGenerator {
    /// Type resolver for looking up type definitions
    type_resolver: TypeResolver,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double", "binary")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties for object types, in field declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Value schema for map-like objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

/// The `additionalProperties` keyword: `true` for free-form objects, or a value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Any(bool),
    Schema(Box<Schema>),
}

impl Schema {
    fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    fn with_format(mut self, format: Option<&str>) -> Self {
        self.format = format.map(str::to_string);
        self
    }

    pub fn string() -> Self {
        Self::of_type("string")
    }

    pub fn boolean() -> Self {
        Self::of_type("boolean")
    }

    pub fn integer() -> Self {
        Self::of_type("integer")
    }

    pub fn number() -> Self {
        Self::of_type("number")
    }

    /// `{type: string, format: binary}`, for uploads and free-form content
    pub fn binary() -> Self {
        Self::string().with_format(Some("binary"))
    }

    /// An untyped object: `{type: object}` with nothing else known
    pub fn object() -> Self {
        Self::of_type("object")
    }

    /// An object accepting any properties
    pub fn free_form() -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Any(true)),
            ..Self::object()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type("array")
        }
    }

    /// A string restricted to `values`
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::string()
        }
    }

    /// An object with the given properties; an empty map leaves `properties` out
    pub fn object_with(properties: IndexMap<String, Schema>) -> Self {
        Self {
            properties: (!properties.is_empty()).then_some(properties),
            ..Self::object()
        }
    }

    /// A map-like object whose values follow `value`
    pub fn map(value: Schema) -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Schema(Box::new(value))),
            ..Self::object()
        }
    }

    /// Set the required property names; an empty list leaves `required` out
    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = (!required.is_empty()).then_some(required);
        self
    }
}

/// Where a synthesized schema is used; decides numeric nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A query parameter or form field of the request
    Parameter { required: bool },
    /// Part of a response body
    Response,
}

impl Position {
    fn nullable(self) -> Option<bool> {
        match self {
            Position::Parameter { required: false } => Some(true),
            _ => None,
        }
    }
}

/// The chain of declarations whose expansion is in progress, innermost first.
///
/// Entries are qualified declaration names, not instantiated types: a generic type that
/// re-enters itself with different arguments (`Nest<T>` holding a `Nest<Vec<T>>`) still
/// closes the cycle.
#[derive(Debug, Clone)]
pub struct Owner<'a> {
    declaration: String,
    outer: Option<&'a Owner<'a>>,
}

impl<'a> Owner<'a> {
    pub fn new(declaration: String, outer: Option<&'a Owner<'a>>) -> Self {
        Self { declaration, outer }
    }

    /// Whether `declaration` is being expanded anywhere along the chain
    pub fn contains(&self, declaration: &str) -> bool {
        self.declaration == declaration
            || self.outer.is_some_and(|outer| outer.contains(declaration))
    }
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with a TypeResolver
    pub fn new(type_resolver: TypeResolver) -> Self {
        debug!("Initializing SchemaGenerator");
        Self { type_resolver }
    }

    pub fn type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Schema of a response entity; `None` for the unit type
    pub fn generate_response_schema(&self, type_info: &TypeInfo) -> Option<Schema> {
        debug!("Generating response schema for type: {}", type_info);
        self.synthesize(None, type_info, Position::Response)
    }

    /// Schema of a request parameter or form field; `None` for the unit type
    pub fn generate_parameter_schema(&self, type_info: &TypeInfo, required: bool) -> Option<Schema> {
        debug!("Generating parameter schema for type: {}", type_info);
        self.synthesize(None, type_info, Position::Parameter { required })
    }

    /// Synthesize the schema of `type_info`.
    ///
    /// `owner` is the chain of object types currently being expanded. A type found on the
    /// chain is not expanded again but emitted as an untyped object, so the result is
    /// always finite. Returns `None` for the unit type, which callers treat as "omit".
    pub fn synthesize(
        &self,
        owner: Option<&Owner<'_>>,
        type_info: &TypeInfo,
        position: Position,
    ) -> Option<Schema> {
        let ty = self.type_resolver.normalize(type_info);
        if ty.is_unit() {
            return None;
        }

        let schema = match classify(&ty, &self.type_resolver) {
            SchemaKind::String { format } => Schema::string().with_format(format),
            SchemaKind::Boolean => Schema::boolean(),
            SchemaKind::Integer { format } => Schema {
                nullable: position.nullable(),
                ..Schema::integer().with_format(format)
            },
            SchemaKind::Number { format } => Schema {
                nullable: position.nullable(),
                ..Schema::number().with_format(format)
            },
            SchemaKind::Enum(values) => Schema::enumeration(values),
            SchemaKind::Array(None) => Schema::array(Schema::object()),
            SchemaKind::Array(Some(element)) => Schema::array(
                self.synthesize(owner, &element, position)
                    .unwrap_or_else(Schema::object),
            ),
            SchemaKind::Map(None) => Schema::free_form(),
            SchemaKind::Map(Some(value)) => Schema::map(
                self.synthesize(owner, &value, position)
                    .unwrap_or_else(Schema::object),
            ),
            SchemaKind::Object => self.object_schema(owner, &ty, position),
        };
        Some(schema)
    }

    fn object_schema(&self, owner: Option<&Owner<'_>>, ty: &TypeInfo, position: Position) -> Schema {
        let Some(def) = self.type_resolver.find_type(&ty.name) else {
            debug!("Unknown type: {}, using object placeholder", ty);
            return Schema::object();
        };

        let declaration = def.qualified_name();
        if owner.is_some_and(|o| o.contains(&declaration)) {
            debug!("{} re-entered while expanding itself, using untyped object", ty);
            return Schema::object();
        }

        let chain = Owner::new(declaration, owner);
        match &def.kind {
            TypeKind::Newtype(inner) => {
                let inner = TypeResolver::substitute(inner, &def.bindings(ty));
                self.synthesize(Some(&chain), &inner, position)
                    .unwrap_or_else(Schema::object)
            }
            TypeKind::Struct(_) => {
                let mut properties = IndexMap::new();
                self.collect_properties(&chain, ty, position, &mut properties);
                Schema::object_with(properties)
            }
            TypeKind::Enum(_) => Schema::object(),
        }
    }

    /// Add the properties of struct `ty` to `properties`, descending into flattened fields.
    ///
    /// Returns `false` when a flattened field could not be resolved; collection stops there and
    /// whatever was gathered so far is kept.
    fn collect_properties(
        &self,
        chain: &Owner<'_>,
        ty: &TypeInfo,
        position: Position,
        properties: &mut IndexMap<String, Schema>,
    ) -> bool {
        let Some((_, struct_def, bindings)) = self.type_resolver.resolve_struct(ty) else {
            debug!("Could not resolve fields of {}", ty);
            return false;
        };

        for field in &struct_def.fields {
            if field.serde_attrs.skip {
                continue;
            }
            let field_type = TypeResolver::substitute(&field.type_info, &bindings);
            let normalized = self.type_resolver.normalize(&field_type);
            if normalized.simple_name() == "PhantomData" {
                continue;
            }

            if field.serde_attrs.flatten {
                if matches!(classify(&normalized, &self.type_resolver), SchemaKind::Map(_)) {
                    continue;
                }
                let Some(declaration) = self
                    .type_resolver
                    .find_type(&normalized.name)
                    .map(|def| def.qualified_name())
                else {
                    debug!("Could not resolve flattened field {} of {}", field.name, ty);
                    return false;
                };
                if chain.contains(&declaration) {
                    debug!("Skipping flattened field {} of {}, already being expanded", field.name, ty);
                    continue;
                }
                let inner_chain = Owner::new(declaration, Some(chain));
                if !self.collect_properties(&inner_chain, &normalized, position, properties) {
                    debug!("Stopped collecting properties of {} at field {}", ty, field.name);
                    return false;
                }
                continue;
            }

            if let Some(schema) = self.synthesize(Some(chain), &field_type, position) {
                properties.insert(field.property_name().to_string(), schema);
            }
        }
        true
    }
}
