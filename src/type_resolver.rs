//! The static type model the schema synthesizer queries.
//!
//! [`TypeResolver`] indexes every struct, enum, trait, trait impl and type alias found in the
//! parsed source files. It plays the role of runtime type introspection: given a [`TypeInfo`]
//! it answers what kind of declaration stands behind the name, which fields it declares (in
//! declaration order, with their attribute tags) and which generic arguments a type binds to
//! a capability trait through its chain of impls and supertraits.
//!
//! Declarations are keyed by their qualified name (`users::Model`). Type paths written in the
//! source are resolved the way the compiler would look them up from the enclosing module:
//! `crate::`/`self::`/`super::` paths, `use` imports (including globs), the module's own
//! declarations and crate-root paths. A bare name that none of these explain falls back to
//! the only declaration carrying that simple name; when several modules declare it, the
//! reference is left unresolved and a warning is logged.

use crate::classifier::is_transparent_wrapper;
use crate::extractor::TypeInfo;
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use syn::visit::{self, Visit};

/// Upper bound on alias/wrapper unwrapping, guards against `type A = B; type B = A;`
const MAX_NORMALIZE_STEPS: usize = 32;

/// Type resolver - index of type declarations across all parsed files
pub struct TypeResolver {
    /// Struct and enum declarations by qualified name
    types: HashMap<String, TypeDef>,
    /// Keys of `types`, in the order they were declared
    declaration_order: Vec<String>,
    /// Trait declarations by qualified name
    traits: HashMap<String, TraitDef>,
    /// Every `impl Trait for Type` block
    impls: Vec<ImplDef>,
    /// `type Name<..> = ..;` declarations by qualified name
    aliases: HashMap<String, AliasDef>,
    /// Qualified names of every declaration, by simple name
    simple_names: HashMap<String, Vec<String>>,
}

/// A struct or enum declaration
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// The type's simple name
    pub name: String,
    /// Module the type was declared in, e.g. `users::list`; empty for the crate root
    pub module_path: String,
    /// Names of the declared type parameters
    pub generics: Vec<String>,
    /// Shape of the declaration
    pub kind: TypeKind,
    /// Outer attributes on the declaration
    pub attrs: Vec<syn::Attribute>,
}

/// Type kind - the shapes of declaration the synthesizer distinguishes
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A struct with named fields (unit structs and multi-field tuple structs have none)
    Struct(StructDef),
    /// A single-field tuple struct or `#[serde(transparent)]` struct, serialized as its inner type
    Newtype(TypeInfo),
    /// An enum
    Enum(EnumDef),
}

/// Struct definition with fields
#[derive(Debug, Clone, Default)]
pub struct StructDef {
    /// The fields of the struct, in declaration order
    pub fields: Vec<FieldDef>,
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type of the field
    pub type_info: TypeInfo,
    /// Attribute tags present on the field, e.g. `request_parameter`, `not_blank`.
    /// Idents nested in list attributes such as `#[validate(not_blank)]` are recorded too.
    pub tags: Vec<String>,
    /// Explicit name from `#[request_parameter(name = "..")]`
    pub parameter_name: Option<String>,
    /// Serde attributes applied to this field
    pub serde_attrs: SerdeAttributes,
}

/// Enum definition with variants
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// Serialized names of the variants, in declaration order
    pub variants: Vec<String>,
    /// Whether every variant is a unit variant
    pub unit_only: bool,
}

/// Serde attributes for a field or variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeAttributes {
    /// Renamed field name
    pub rename: Option<String>,
    /// Whether the field is left out of serialization
    pub skip: bool,
    /// Whether the field's own fields are inlined into the parent
    pub flatten: bool,
    /// Whether the container is serialized as its single field
    pub transparent: bool,
}

/// A trait declaration
#[derive(Debug, Clone)]
pub struct TraitDef {
    /// Names of the declared type parameters
    pub generics: Vec<String>,
    /// Supertrait bounds, e.g. `RestAction<M, Vec<M>>`
    pub supertraits: Vec<TypeInfo>,
}

/// An `impl<generics> Trait<..> for SelfType<..>` block
#[derive(Debug, Clone)]
pub struct ImplDef {
    pub trait_ref: TypeInfo,
    pub self_ty: TypeInfo,
    pub generics: Vec<String>,
}

/// A `type Name<generics> = target;` declaration
#[derive(Debug, Clone)]
pub struct AliasDef {
    pub generics: Vec<String>,
    pub target: TypeInfo,
}

impl TypeDef {
    /// The name prefixed with the module path
    pub fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module_path, self.name)
        }
    }

    /// The declared type with its own parameters as arguments, e.g. `model::Page<T>`
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo::generic(
            self.qualified_name(),
            self.generics.iter().map(TypeInfo::new).collect(),
        )
    }

    /// Find an outer attribute by its (last path segment) name
    pub fn attribute(&self, name: &str) -> Option<&syn::Attribute> {
        self.attrs.iter().find(|attr| {
            attr.path()
                .segments
                .last()
                .is_some_and(|segment| segment.ident == name)
        })
    }

    /// Map the declared type parameters to the arguments of `usage`
    pub fn bindings(&self, usage: &TypeInfo) -> HashMap<String, TypeInfo> {
        self.generics
            .iter()
            .cloned()
            .zip(usage.generic_args.iter().cloned())
            .collect()
    }
}

impl FieldDef {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Name of the field in serialized output
    pub fn property_name(&self) -> &str {
        self.serde_attrs.rename.as_deref().unwrap_or(&self.name)
    }
}

impl TypeResolver {
    /// Create a new TypeResolver indexing the declarations in `parsed_files`
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());

        // Every declared name must be known before the first type path is resolved
        let mut index = NameIndex::default();
        for parsed_file in parsed_files {
            let mut collector = NameCollector {
                index: &mut index,
                module_stack: module_segments(&parsed_file.module_path),
            };
            collector.visit_file(&parsed_file.syntax_tree);
        }

        let mut resolver = Self {
            types: HashMap::new(),
            declaration_order: Vec::new(),
            traits: HashMap::new(),
            impls: Vec::new(),
            aliases: HashMap::new(),
            simple_names: HashMap::new(),
        };

        for parsed_file in parsed_files {
            let mut collector = DeclarationCollector {
                resolver: &mut resolver,
                index: &index,
                module_stack: module_segments(&parsed_file.module_path),
            };
            collector.visit_file(&parsed_file.syntax_tree);
        }
        resolver.simple_names = index.simple_names;

        debug!(
            "Indexed {} types, {} traits, {} impls, {} aliases",
            resolver.types.len(),
            resolver.traits.len(),
            resolver.impls.len(),
            resolver.aliases.len()
        );
        resolver
    }

    /// Find a struct or enum declaration by qualified name, or by a simple name only one
    /// module declares
    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.lookup(&self.types, name)
    }

    /// All struct and enum declarations, in declaration order
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.declaration_order
            .iter()
            .filter_map(move |name| self.types.get(name))
    }

    fn lookup<'m, V>(&self, map: &'m HashMap<String, V>, name: &str) -> Option<&'m V> {
        if let Some(value) = map.get(name) {
            return Some(value);
        }
        if name.contains("::") {
            return None;
        }
        let mut candidates = self
            .simple_names
            .get(name)?
            .iter()
            .filter_map(|qualified| map.get(qualified));
        let found = candidates.next()?;
        if candidates.next().is_some() {
            debug!("Simple name {} matches several declarations", name);
            return None;
        }
        Some(found)
    }

    /// Strip transparent wrappers (`Option`, `Box`, ...) and expand type aliases
    pub fn normalize(&self, type_info: &TypeInfo) -> TypeInfo {
        let mut current = type_info.clone();
        for _ in 0..MAX_NORMALIZE_STEPS {
            if is_transparent_wrapper(&current) {
                current = current.generic_args[0].clone();
                continue;
            }
            if !current.is_array {
                if let Some(alias) = self.lookup(&self.aliases, &current.name) {
                    let bindings: HashMap<String, TypeInfo> = alias
                        .generics
                        .iter()
                        .cloned()
                        .zip(current.generic_args.iter().cloned())
                        .collect();
                    current = Self::substitute(&alias.target, &bindings);
                    continue;
                }
            }
            break;
        }
        current
    }

    /// Resolve a type to a struct declaration with named fields, together with the bindings
    /// of its type parameters.
    pub fn resolve_struct(
        &self,
        type_info: &TypeInfo,
    ) -> Option<(&TypeDef, &StructDef, HashMap<String, TypeInfo>)> {
        let normalized = self.normalize(type_info);
        if normalized.is_array {
            return None;
        }
        let def = self.find_type(&normalized.name)?;
        match &def.kind {
            TypeKind::Struct(struct_def) => Some((def, struct_def, def.bindings(&normalized))),
            _ => None,
        }
    }

    /// Replace type parameters in `type_info` by their bound arguments
    pub fn substitute(type_info: &TypeInfo, bindings: &HashMap<String, TypeInfo>) -> TypeInfo {
        if !type_info.is_array && type_info.generic_args.is_empty() {
            if let Some(bound) = bindings.get(&type_info.name) {
                return bound.clone();
            }
        }
        TypeInfo {
            name: type_info.name.clone(),
            generic_args: type_info
                .generic_args
                .iter()
                .map(|arg| Self::substitute(arg, bindings))
                .collect(),
            is_array: type_info.is_array,
        }
    }

    /// Resolve the arguments `type_info` binds to the trait named `capability`.
    ///
    /// Walks every `impl Trait for Type` of the type and then the supertrait chain of each
    /// implemented trait, substituting type parameters at each step. The capability is
    /// matched by simple name, wherever it is declared. Returns `None` when the capability is
    /// not reachable. Arguments that still refer to an unbound type parameter are left out,
    /// so a raw or partially parameterized binding yields fewer arguments than the capability
    /// declares.
    pub fn resolve_generic_arguments(
        &self,
        type_info: &TypeInfo,
        capability: &str,
    ) -> Option<Vec<TypeInfo>> {
        debug!("Resolving {} arguments of {}", capability, type_info);

        let def = self.find_type(&type_info.name);
        let actual = TypeInfo {
            name: def.map_or_else(|| type_info.name.clone(), TypeDef::qualified_name),
            ..type_info.clone()
        };
        let own_parameters: Vec<String> = def
            .map(|def| {
                def.generics
                    .iter()
                    .filter(|param| type_info.generic_args.contains(&TypeInfo::new(param.as_str())))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for imp in self.impls.iter().filter(|imp| imp.self_ty.name == actual.name) {
            let mut bindings = HashMap::new();
            Self::bind(&imp.self_ty, &actual, &imp.generics, &mut bindings);

            let mut unbound: Vec<String> = imp
                .generics
                .iter()
                .filter(|param| !bindings.contains_key(*param))
                .cloned()
                .collect();
            unbound.extend(own_parameters.iter().cloned());

            let trait_ref = Self::substitute(&imp.trait_ref, &bindings);
            let mut visited = HashSet::new();
            if let Some(arguments) =
                self.walk_supertraits(&trait_ref, capability, &mut visited, &mut unbound)
            {
                let resolved: Vec<TypeInfo> = arguments
                    .into_iter()
                    .filter(|arg| !arg.mentions_any(&unbound))
                    .collect();
                debug!("Resolved {} argument(s) via {}", resolved.len(), trait_ref);
                return Some(resolved);
            }
        }

        None
    }

    fn walk_supertraits(
        &self,
        trait_ref: &TypeInfo,
        capability: &str,
        visited: &mut HashSet<String>,
        unbound: &mut Vec<String>,
    ) -> Option<Vec<TypeInfo>> {
        if trait_ref.simple_name() == capability {
            return Some(trait_ref.generic_args.clone());
        }
        if !visited.insert(trait_ref.name.clone()) {
            return None;
        }

        let def = self.lookup(&self.traits, &trait_ref.name)?;
        let bindings: HashMap<String, TypeInfo> = def
            .generics
            .iter()
            .cloned()
            .zip(trait_ref.generic_args.iter().cloned())
            .collect();
        unbound.extend(
            def.generics
                .iter()
                .filter(|param| !bindings.contains_key(*param))
                .cloned(),
        );

        def.supertraits.iter().find_map(|supertrait| {
            let supertrait = Self::substitute(supertrait, &bindings);
            self.walk_supertraits(&supertrait, capability, visited, unbound)
        })
    }

    /// Match `pattern` (which may mention `params`) against `actual`, recording bindings
    fn bind(
        pattern: &TypeInfo,
        actual: &TypeInfo,
        params: &[String],
        bindings: &mut HashMap<String, TypeInfo>,
    ) {
        if !pattern.is_array
            && pattern.generic_args.is_empty()
            && params.contains(&pattern.name)
        {
            bindings.insert(pattern.name.clone(), actual.clone());
            return;
        }
        if pattern.name == actual.name
            && pattern.is_array == actual.is_array
            && pattern.generic_args.len() == actual.generic_args.len()
        {
            for (p, a) in pattern.generic_args.iter().zip(&actual.generic_args) {
                Self::bind(p, a, params, bindings);
            }
        }
    }

    fn insert_type(&mut self, def: TypeDef) {
        let key = def.qualified_name();
        if self.types.contains_key(&key) {
            warn!(
                "Type {} is declared more than once; keeping the first declaration",
                key
            );
            return;
        }
        self.declaration_order.push(key.clone());
        self.types.insert(key, def);
    }

    fn parse_struct_definition(
        item_struct: &syn::ItemStruct,
        module_path: String,
        scope: &Scope<'_>,
    ) -> TypeDef {
        let struct_name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", struct_name);

        let container_attrs = parse_serde_attributes(&item_struct.attrs);
        let kind = match &item_struct.fields {
            syn::Fields::Named(named) if container_attrs.transparent && named.named.len() == 1 => {
                TypeKind::Newtype(scope.type_info(&named.named[0].ty))
            }
            syn::Fields::Named(named) => TypeKind::Struct(StructDef {
                fields: named
                    .named
                    .iter()
                    .filter_map(|field| parse_field(field, scope))
                    .collect(),
            }),
            syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                TypeKind::Newtype(scope.type_info(&unnamed.unnamed[0].ty))
            }
            _ => TypeKind::Struct(StructDef::default()),
        };

        TypeDef {
            name: struct_name,
            module_path,
            generics: scope.generics.to_vec(),
            kind,
            attrs: item_struct.attrs.clone(),
        }
    }

    fn parse_enum_definition(item_enum: &syn::ItemEnum, module_path: String) -> TypeDef {
        let enum_name = item_enum.ident.to_string();
        debug!("Parsing enum definition: {}", enum_name);

        let unit_only = item_enum
            .variants
            .iter()
            .all(|v| matches!(v.fields, syn::Fields::Unit));
        let variants: Vec<String> = item_enum
            .variants
            .iter()
            .filter_map(|v| {
                let serde_attrs = parse_serde_attributes(&v.attrs);
                if serde_attrs.skip {
                    return None;
                }
                Some(serde_attrs.rename.unwrap_or_else(|| v.ident.to_string()))
            })
            .collect();

        debug!("Parsed {} variants", variants.len());

        TypeDef {
            name: enum_name,
            module_path,
            generics: type_parameters(&item_enum.generics),
            kind: TypeKind::Enum(EnumDef {
                variants,
                unit_only,
            }),
            attrs: item_enum.attrs.clone(),
        }
    }
}

/// Declared names and `use` imports of the project, gathered before any type is read
#[derive(Default)]
struct NameIndex {
    /// Qualified names of structs, enums, traits and aliases
    declared: HashSet<String>,
    /// Qualified names by simple name, in declaration order
    simple_names: HashMap<String, Vec<String>>,
    /// `use` imports by module path
    imports: HashMap<String, ModuleImports>,
}

#[derive(Default)]
struct ModuleImports {
    /// `use a::b::C as D;` maps `D` to `[a, b, C]`
    names: HashMap<String, Vec<String>>,
    /// `use a::b::*;` records `[a, b]`
    globs: Vec<Vec<String>>,
}

impl NameIndex {
    fn declare(&mut self, module: &[String], ident: &syn::Ident) {
        let simple = ident.to_string();
        let qualified = qualify(module, &simple);
        let qualified_names = self.simple_names.entry(simple).or_default();
        if !qualified_names.contains(&qualified) {
            qualified_names.push(qualified.clone());
        }
        self.declared.insert(qualified);
    }

    fn declared_name(&self, segments: &[String]) -> Option<String> {
        let name = segments.join("::");
        self.declared.contains(&name).then_some(name)
    }

    /// The qualified name of the declaration `path` refers to from inside `module`, or
    /// `None` for type parameters, foreign types and ambiguous names
    fn resolve(&self, path: &syn::Path, module: &[String], generics: &[String]) -> Option<String> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let [first, rest @ ..] = segments.as_slice() else {
            return None;
        };
        if rest.is_empty() && generics.contains(first) {
            return None;
        }

        if let Some(absolute) = anchored(module, &segments) {
            return self.declared_name(&absolute);
        }

        let imports = self.imports.get(&module.join("::"));
        let mut candidates: Vec<Vec<String>> = Vec::new();
        if let Some(target) = imports.and_then(|imports| imports.names.get(first)) {
            let expanded: Vec<String> = target.iter().chain(rest).cloned().collect();
            match anchored(module, &expanded) {
                Some(absolute) => candidates.push(absolute),
                None => {
                    candidates.push(module.iter().chain(&expanded).cloned().collect());
                    candidates.push(expanded);
                }
            }
        }
        candidates.push(module.iter().chain(&segments).cloned().collect());
        candidates.push(segments.clone());
        for glob in imports.map(|imports| imports.globs.as_slice()).unwrap_or_default() {
            let base = anchored(module, glob).unwrap_or_else(|| glob.clone());
            candidates.push(base.iter().chain(&segments).cloned().collect());
        }

        if let Some(found) = candidates.iter().find_map(|c| self.declared_name(c)) {
            return Some(found);
        }
        if !rest.is_empty() {
            return None;
        }

        match self.simple_names.get(first).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            Some(several) if several.len() > 1 => {
                warn!(
                    "Type {} used in module '{}' is declared in several modules ({}); import it to disambiguate",
                    first,
                    module.join("::"),
                    several.join(", ")
                );
                None
            }
            _ => None,
        }
    }
}

/// Make a `crate::`, `self::` or `super::` path absolute; `None` for any other path
fn anchored(module: &[String], segments: &[String]) -> Option<Vec<String>> {
    match segments.first().map(String::as_str) {
        Some("crate") => Some(segments[1..].to_vec()),
        Some("self") => Some(module.iter().chain(&segments[1..]).cloned().collect()),
        Some("super") => {
            let supers = segments.iter().take_while(|s| *s == "super").count();
            let base = module.len().saturating_sub(supers);
            Some(module[..base].iter().chain(&segments[supers..]).cloned().collect())
        }
        _ => None,
    }
}

fn qualify(module: &[String], name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module.join("::"), name)
    }
}

fn module_segments(module_path: &str) -> Vec<String> {
    module_path
        .split("::")
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn collect_use_tree(tree: &syn::UseTree, prefix: &mut Vec<String>, imports: &mut ModuleImports) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use_tree(&path.tree, prefix, imports);
            prefix.pop();
        }
        syn::UseTree::Name(name) => import_name(&name.ident, &name.ident, prefix, imports),
        syn::UseTree::Rename(rename) => import_name(&rename.ident, &rename.rename, prefix, imports),
        syn::UseTree::Glob(_) => imports.globs.push(prefix.clone()),
        syn::UseTree::Group(group) => {
            for item in &group.items {
                collect_use_tree(item, prefix, imports);
            }
        }
    }
}

/// Record `use prefix::ident as alias;`, where `ident` may be `self`
fn import_name(
    ident: &syn::Ident,
    alias: &syn::Ident,
    prefix: &[String],
    imports: &mut ModuleImports,
) {
    let (key, target) = if ident == "self" {
        let Some(last) = prefix.last() else {
            return;
        };
        let key = if alias == "self" { last.clone() } else { alias.to_string() };
        (key, prefix.to_vec())
    } else {
        let mut target = prefix.to_vec();
        target.push(ident.to_string());
        (alias.to_string(), target)
    };
    imports.names.insert(key, target);
}

/// First pass: declared names and imports, tracking inline `mod` nesting
struct NameCollector<'i> {
    index: &'i mut NameIndex,
    module_stack: Vec<String>,
}

impl<'ast> Visit<'ast> for NameCollector<'_> {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_stack.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module_stack.pop();
    }

    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}

    fn visit_item_impl(&mut self, _node: &'ast syn::ItemImpl) {}

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.index.declare(&self.module_stack, &node.ident);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.index.declare(&self.module_stack, &node.ident);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.index.declare(&self.module_stack, &node.ident);
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.index.declare(&self.module_stack, &node.ident);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let imports = self
            .index
            .imports
            .entry(self.module_stack.join("::"))
            .or_default();
        collect_use_tree(&node.tree, &mut Vec::new(), imports);
    }
}

/// Where a type is written: the enclosing module and the type parameters in scope
struct Scope<'a> {
    index: &'a NameIndex,
    module: &'a [String],
    generics: &'a [String],
}

impl Scope<'_> {
    fn type_info(&self, ty: &syn::Type) -> TypeInfo {
        TypeInfo::from_syn_with(ty, &|path| self.index.resolve(path, self.module, self.generics))
    }

    fn path_info(&self, path: &syn::Path) -> TypeInfo {
        TypeInfo::from_path_with(path, &|path| {
            self.index.resolve(path, self.module, self.generics)
        })
    }
}

/// Second pass: declarations with every type path resolved, tracking inline `mod` nesting
struct DeclarationCollector<'r> {
    resolver: &'r mut TypeResolver,
    index: &'r NameIndex,
    module_stack: Vec<String>,
}

impl DeclarationCollector<'_> {
    fn module_path(&self) -> String {
        self.module_stack.join("::")
    }

    fn scope<'s>(&'s self, generics: &'s [String]) -> Scope<'s> {
        Scope {
            index: self.index,
            module: &self.module_stack,
            generics,
        }
    }
}

impl<'ast> Visit<'ast> for DeclarationCollector<'_> {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_stack.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module_stack.pop();
    }

    // Items declared inside function bodies are not nameable from elsewhere
    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let generics = type_parameters(&node.generics);
        let def = TypeResolver::parse_struct_definition(
            node,
            self.module_path(),
            &self.scope(&generics),
        );
        self.resolver.insert_type(def);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        let def = TypeResolver::parse_enum_definition(node, self.module_path());
        self.resolver.insert_type(def);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let generics = type_parameters(&node.generics);
        let scope = self.scope(&generics);
        let supertraits = node
            .supertraits
            .iter()
            .filter_map(|bound| match bound {
                syn::TypeParamBound::Trait(trait_bound) => Some(scope.path_info(&trait_bound.path)),
                _ => None,
            })
            .collect();
        let key = qualify(&self.module_stack, &node.ident.to_string());
        self.resolver.traits.entry(key).or_insert(TraitDef {
            generics,
            supertraits,
        });
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let Some((negative, path, _)) = &node.trait_ else {
            return;
        };
        if negative.is_some() {
            return;
        }
        let generics = type_parameters(&node.generics);
        let scope = self.scope(&generics);
        let imp = ImplDef {
            trait_ref: scope.path_info(path),
            self_ty: scope.type_info(&node.self_ty),
            generics: generics.clone(),
        };
        self.resolver.impls.push(imp);
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        let generics = type_parameters(&node.generics);
        let target = self.scope(&generics).type_info(&node.ty);
        let key = qualify(&self.module_stack, &node.ident.to_string());
        self.resolver
            .aliases
            .entry(key)
            .or_insert(AliasDef { generics, target });
    }
}

fn type_parameters(generics: &syn::Generics) -> Vec<String> {
    generics
        .type_params()
        .map(|param| param.ident.to_string())
        .collect()
}

/// Parse a single named field
fn parse_field(field: &syn::Field, scope: &Scope<'_>) -> Option<FieldDef> {
    let field_name = field.ident.as_ref()?.to_string();
    debug!("Parsing field: {}", field_name);

    let mut tags = Vec::new();
    let mut parameter_name = None;
    for attr in &field.attrs {
        let Some(segment) = attr.path().segments.last() else {
            continue;
        };
        let tag = segment.ident.to_string();
        match tag.as_str() {
            "doc" | "serde" => {}
            "request_parameter" => parameter_name = explicit_parameter_name(attr),
            _ => collect_nested_tags(attr, &mut tags),
        }
        tags.push(tag);
    }

    Some(FieldDef {
        name: field_name,
        type_info: scope.type_info(&field.ty),
        tags,
        parameter_name,
        serde_attrs: parse_serde_attributes(&field.attrs),
    })
}

/// Read `name = ".."` from `#[request_parameter(name = "..")]`
fn explicit_parameter_name(attr: &syn::Attribute) -> Option<String> {
    if !matches!(attr.meta, syn::Meta::List(_)) {
        return None;
    }
    let mut name = None;
    if let Err(e) = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let value: syn::LitStr = meta.value()?.parse()?;
            name = Some(value.value());
            Ok(())
        } else {
            skip_meta_value(&meta)
        }
    }) {
        debug!("Ignoring malformed request_parameter attribute: {}", e);
    }
    name.filter(|n| !n.trim().is_empty())
}

/// Record the idents nested in a list attribute such as `#[validate(not_blank, length(min = 1))]`.
/// Anything that is not meta syntax ends collection; the tags read so far are kept.
fn collect_nested_tags(attr: &syn::Attribute, tags: &mut Vec<String>) {
    if !matches!(attr.meta, syn::Meta::List(_)) {
        return;
    }
    if let Err(e) = attr.parse_nested_meta(|meta| visit_nested_meta(meta, tags)) {
        debug!("Stopped reading nested tags of an attribute: {}", e);
    }
}

fn visit_nested_meta(meta: syn::meta::ParseNestedMeta, tags: &mut Vec<String>) -> syn::Result<()> {
    if let Some(ident) = meta.path.get_ident() {
        tags.push(ident.to_string());
    }
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| visit_nested_meta(nested, &mut *tags))
    } else {
        skip_meta_value(&meta)
    }
}

/// Consume `= value` or `(..)` following a nested meta path
fn skip_meta_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta_value(&nested))?;
    }
    Ok(())
}

/// Parse Serde attributes from field, variant or container attributes
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs {
        if !attr.path().is_ident("serde") || !matches!(attr.meta, syn::Meta::List(_)) {
            continue;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(syn::Token![=]) {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    serde_attrs.rename = Some(value.value());
                } else {
                    // rename(serialize = "..", deserialize = "..")
                    meta.parse_nested_meta(|nested| {
                        if nested.path.is_ident("serialize") {
                            let value: syn::LitStr = nested.value()?.parse()?;
                            serde_attrs.rename = Some(value.value());
                            Ok(())
                        } else {
                            skip_meta_value(&nested)
                        }
                    })?;
                }
                return Ok(());
            }
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde_attrs.skip = true;
            } else if meta.path.is_ident("flatten") {
                serde_attrs.flatten = true;
            } else if meta.path.is_ident("transparent") {
                serde_attrs.transparent = true;
            }
            skip_meta_value(&meta)
        });
        if let Err(e) = parsed {
            debug!("Ignoring the rest of a malformed serde attribute: {}", e);
        }
    }

    serde_attrs
}
