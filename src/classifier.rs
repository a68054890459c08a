//! Mapping of a single type reference to the kind of schema node that represents it.
//!
//! Classification is shallow: it looks at one type, never at its fields, so it always
//! terminates. The synthesizer decides what to do with the element or value types that
//! [`SchemaKind::Array`] and [`SchemaKind::Map`] carry.

use crate::extractor::TypeInfo;
use crate::type_resolver::{TypeKind, TypeResolver};

/// Generic types serialized as their single type argument
pub const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cell", "RefCell", "Cow"];

/// Collection types serialized as JSON arrays
pub const LIST_CONTAINERS: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "BinaryHeap",
    "IndexSet",
];

/// Collection types serialized as JSON objects keyed by the map key
pub const MAP_CONTAINERS: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];

/// The kind of schema node a type maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    String { format: Option<&'static str> },
    Boolean,
    Integer { format: Option<&'static str> },
    Number { format: Option<&'static str> },
    /// A unit-only enum, with its serialized variant names
    Enum(Vec<String>),
    /// A list-like container, array or slice; `None` when the element type is not declared
    Array(Option<TypeInfo>),
    /// A map-like container; `None` when the value type is not declared
    Map(Option<TypeInfo>),
    Object,
}

/// Whether `type_info` is one of the [`TRANSPARENT_WRAPPERS`] applied to exactly one type
pub fn is_transparent_wrapper(type_info: &TypeInfo) -> bool {
    !type_info.is_array
        && type_info.generic_args.len() == 1
        && TRANSPARENT_WRAPPERS.contains(&type_info.name.as_str())
}

/// Classify `type_info` after unwrapping transparent wrappers and type aliases.
///
/// Names the resolver does not know, including the unit type, classify as [`SchemaKind::Object`].
pub fn classify(type_info: &TypeInfo, type_resolver: &TypeResolver) -> SchemaKind {
    let ty = type_resolver.normalize(type_info);
    if ty.is_array {
        return SchemaKind::Array(ty.generic_args.first().cloned());
    }

    let name = ty.name.as_str();
    match name {
        "String" | "str" | "char" | "Cow" | "PathBuf" | "NaiveTime" | "Time" => {
            SchemaKind::String { format: None }
        }
        "NaiveDate" | "Date" => SchemaKind::String {
            format: Some("date"),
        },
        "NaiveDateTime" | "DateTime" | "SystemTime" | "OffsetDateTime" | "PrimitiveDateTime" => {
            SchemaKind::String {
                format: Some("date-time"),
            }
        }
        "Uuid" => SchemaKind::String {
            format: Some("uuid"),
        },
        "bool" => SchemaKind::Boolean,
        "f32" => SchemaKind::Number {
            format: Some("float"),
        },
        "f64" => SchemaKind::Number {
            format: Some("double"),
        },
        "Decimal" | "BigDecimal" => SchemaKind::Number { format: None },
        "BigInt" | "BigUint" => SchemaKind::Integer { format: None },
        "NonZero" => SchemaKind::Integer {
            format: ty.generic_args.first().and_then(|arg| integer_format(&arg.name)),
        },
        _ if name.starts_with("NonZero") => SchemaKind::Integer {
            format: integer_format(&name["NonZero".len()..].to_ascii_lowercase()),
        },
        _ if integer_format(name).is_some() => SchemaKind::Integer {
            format: integer_format(name),
        },
        _ if LIST_CONTAINERS.contains(&name) => SchemaKind::Array(match ty.generic_args.as_slice() {
            [element] => Some(element.clone()),
            _ => None,
        }),
        _ if MAP_CONTAINERS.contains(&name) => SchemaKind::Map(match ty.generic_args.as_slice() {
            [_, value] => Some(value.clone()),
            _ => None,
        }),
        _ => match type_resolver.find_type(name).map(|def| &def.kind) {
            Some(TypeKind::Enum(enum_def)) if enum_def.unit_only => {
                SchemaKind::Enum(enum_def.variants.clone())
            }
            _ => SchemaKind::Object,
        },
    }
}

/// OpenAPI format of a primitive integer type, `None` for anything else
fn integer_format(name: &str) -> Option<&'static str> {
    match name {
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => Some("int32"),
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => Some("int64"),
        _ => None,
    }
}
