//! Action descriptor extraction for REST action handler types.
//!
//! A REST action is a type tagged with `#[rest_action(..)]` that implements the
//! `RestAction<Model, Response>` capability, either directly or through a chain of
//! supertraits that fix the generic arguments on the way:
//!
//! ```ignore
//! pub trait ListAction<M>: RestAction<M, Vec<M>> {}
//!
//! #[rest_action(GET)]
//! pub struct ListUsersRestAction;
//! impl ListAction<UserFilter> for ListUsersRestAction {}
//! ```
//!
//! The [`ActionExtractor`] resolves the two generic arguments through that chain and
//! reads the declared HTTP method from the attribute, producing an [`ActionDescriptor`].

use crate::error::SkipReason;
use crate::type_resolver::{TypeDef, TypeResolver};
use log::debug;
use std::fmt;

/// Name of the base capability whose generic arguments describe an action
pub const REST_ACTION_CAPABILITY: &str = "RestAction";

/// Name of the attribute marking a type as a REST action
pub const REST_ACTION_ATTRIBUTE: &str = "rest_action";

/// Everything the document assembler needs to know about one REST action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    /// The HTTP method declared on the action
    pub http_method: HttpMethod,
    /// First argument of `RestAction<Model, Response>`; `()` when the action takes no model
    pub request_model: TypeInfo,
    /// Second argument of `RestAction<Model, Response>`; `()` when the action returns no entity
    pub response_entity: TypeInfo,
    /// The type's own name, e.g. `ListUsersRestAction`
    pub simple_name: String,
    /// The type's name prefixed with its module path, used in log messages
    pub qualified_name: String,
}

/// HTTP methods a REST action may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    /// Parse a method name case-insensitively (`GET`, `Post`, `delete`, ...)
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a declared type, as written in source.
///
/// Paths to declarations of the scanned project are named by their qualified name
/// (`model::User`); other paths are reduced to their last segment (`std::vec::Vec<T>` becomes
/// `Vec<T>`). Lifetimes and
/// const arguments are dropped, references are looked through, and arrays and slices are
/// represented by `is_array` with the element as the single generic argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// The base type name (e.g. "String", "model::User", "Vec"); "()" for the unit type
    pub name: String,
    /// Type arguments in declaration order
    pub generic_args: Vec<TypeInfo>,
    /// Whether this is an array `[T; N]` or slice `[T]`
    pub is_array: bool,
}

const UNIT_NAME: &str = "()";
const ARRAY_NAME: &str = "[]";

/// Placeholder name for type syntax that has no schema meaning (fn pointers, trait objects, tuples)
pub const UNKNOWN_TYPE_NAME: &str = "Unknown";

impl TypeInfo {
    /// Create a new TypeInfo for a simple type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_args: Vec::new(),
            is_array: false,
        }
    }

    /// Create a TypeInfo for a generic type such as `HashMap<String, User>`
    pub fn generic(name: impl Into<String>, generic_args: Vec<TypeInfo>) -> Self {
        Self {
            name: name.into(),
            generic_args,
            is_array: false,
        }
    }

    /// Create a TypeInfo for an array or slice of `element`
    pub fn array(element: TypeInfo) -> Self {
        Self {
            name: ARRAY_NAME.to_string(),
            generic_args: vec![element],
            is_array: true,
        }
    }

    /// The unit type `()`, which stands for "no model" or "no entity"
    pub fn unit() -> Self {
        Self::new(UNIT_NAME)
    }

    pub fn is_unit(&self) -> bool {
        !self.is_array && self.name == UNIT_NAME
    }

    /// Whether this type, or any of its arguments, is one of `names`
    pub fn mentions_any(&self, names: &[String]) -> bool {
        (!self.is_array && names.iter().any(|n| *n == self.name))
            || self.generic_args.iter().any(|arg| arg.mentions_any(names))
    }

    /// The name without its module path, e.g. `User` for `model::User`
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once("::")
            .map_or(self.name.as_str(), |(_, last)| last)
    }

    /// Extract TypeInfo from a `syn::Type`
    pub fn from_syn(ty: &syn::Type) -> Self {
        Self::from_syn_with(ty, &|_| None)
    }

    /// Extract TypeInfo from a `syn::Type`, naming each path by `resolve` where it returns a
    /// name and by the path's last segment otherwise
    pub fn from_syn_with(ty: &syn::Type, resolve: &dyn Fn(&syn::Path) -> Option<String>) -> Self {
        match ty {
            syn::Type::Path(type_path) => Self::from_path_with(&type_path.path, resolve),
            syn::Type::Reference(reference) => Self::from_syn_with(&reference.elem, resolve),
            syn::Type::Paren(paren) => Self::from_syn_with(&paren.elem, resolve),
            syn::Type::Group(group) => Self::from_syn_with(&group.elem, resolve),
            syn::Type::Array(array) => Self::array(Self::from_syn_with(&array.elem, resolve)),
            syn::Type::Slice(slice) => Self::array(Self::from_syn_with(&slice.elem, resolve)),
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => Self::unit(),
            _ => {
                debug!("Type syntax without schema mapping, using placeholder");
                Self::new(UNKNOWN_TYPE_NAME)
            }
        }
    }

    /// Extract TypeInfo from a `syn::Path`
    pub fn from_path(path: &syn::Path) -> Self {
        Self::from_path_with(path, &|_| None)
    }

    /// Extract TypeInfo from a `syn::Path`, see [`TypeInfo::from_syn_with`]
    pub fn from_path_with(path: &syn::Path, resolve: &dyn Fn(&syn::Path) -> Option<String>) -> Self {
        let Some(segment) = path.segments.last() else {
            return Self::new(UNKNOWN_TYPE_NAME);
        };

        let generic_args = match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(inner) => Some(Self::from_syn_with(inner, resolve)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let name = resolve(path).unwrap_or_else(|| segment.ident.to_string());
        Self::generic(name, generic_args)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            return match self.generic_args.first() {
                Some(element) => write!(f, "[{}]", element),
                None => f.write_str(ARRAY_NAME),
            };
        }
        f.write_str(&self.name)?;
        if !self.generic_args.is_empty() {
            let args: Vec<String> = self.generic_args.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

/// Builds [`ActionDescriptor`]s for discovered action types.
pub struct ActionExtractor<'a> {
    type_resolver: &'a TypeResolver,
}

impl<'a> ActionExtractor<'a> {
    pub fn new(type_resolver: &'a TypeResolver) -> Self {
        Self { type_resolver }
    }

    /// Resolve the model/response types and HTTP method of one action type.
    ///
    /// # Errors
    ///
    /// Returns a [`SkipReason`] when the `RestAction` arguments cannot be bound to exactly two
    /// concrete types or when the attribute names an unknown method.
    pub fn extract(&self, action: &TypeDef) -> Result<ActionDescriptor, SkipReason> {
        let qualified_name = action.qualified_name();
        debug!("Extracting action descriptor for {}", qualified_name);

        let arguments = self
            .type_resolver
            .resolve_generic_arguments(&action.type_info(), REST_ACTION_CAPABILITY)
            .unwrap_or_default();

        let [request_model, response_entity] =
            <[TypeInfo; 2]>::try_from(arguments).map_err(|arguments| {
                SkipReason::UnresolvedGenerics {
                    type_name: qualified_name.clone(),
                    resolved: arguments.len(),
                }
            })?;

        let http_method = Self::declared_method(action).map_err(|value| {
            SkipReason::UnrecognizedMethod {
                type_name: qualified_name.clone(),
                value,
            }
        })?;

        Ok(ActionDescriptor {
            http_method,
            request_model,
            response_entity,
            simple_name: action.name.clone(),
            qualified_name,
        })
    }

    /// Read the method from `#[rest_action(GET)]` or `#[rest_action(method = "POST")]`.
    ///
    /// A bare `#[rest_action]` declares GET.
    fn declared_method(action: &TypeDef) -> Result<HttpMethod, String> {
        let Some(attr) = action.attribute(REST_ACTION_ATTRIBUTE) else {
            return Ok(HttpMethod::Get);
        };
        if !matches!(attr.meta, syn::Meta::List(_)) {
            return Ok(HttpMethod::Get);
        }

        let mut declared: Option<String> = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("method") {
                let value: syn::Expr = meta.value()?.parse()?;
                declared = match value {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) => Some(lit.value()),
                    syn::Expr::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
                    _ => return Err(meta.error("expected a method name")),
                };
            } else if let Some(segment) = meta.path.segments.last() {
                declared = Some(segment.ident.to_string());
            }
            Ok(())
        })
        .map_err(|e| e.to_string())?;

        match declared {
            None => Ok(HttpMethod::Get),
            Some(value) => HttpMethod::parse(&value).ok_or(value),
        }
    }
}
