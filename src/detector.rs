use crate::extractor::REST_ACTION_ATTRIBUTE;
use crate::type_resolver::{TypeDef, TypeResolver};
use log::debug;

/// Action detector for finding REST action types in a Rust project.
///
/// The `ActionDetector` walks the declarations indexed by a [`TypeResolver`] and picks
/// those tagged `#[rest_action(..)]`, optionally restricted to a set of action packages.
/// An action package is a module path prefix: `users` selects `users` and `users::list`
/// but not `users_admin`.
pub struct ActionDetector;

/// Result of action detection.
pub struct DetectionResult<'r> {
    /// Detected action types, in declaration order
    pub actions: Vec<&'r TypeDef>,
}

impl ActionDetector {
    /// Detects REST action types.
    ///
    /// # Arguments
    ///
    /// * `type_resolver` - Resolver holding every declaration of the project
    /// * `packages` - Module path prefixes to search; empty means every module
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rest_action_openapi::detector::ActionDetector;
    /// use rest_action_openapi::type_resolver::TypeResolver;
    ///
    /// let resolver = TypeResolver::new(&[]);
    /// let result = ActionDetector::detect(&resolver, &["users".to_string()]);
    /// println!("Detected {} action(s)", result.actions.len());
    /// ```
    pub fn detect<'r>(type_resolver: &'r TypeResolver, packages: &[String]) -> DetectionResult<'r> {
        debug!("Detecting REST actions in packages {:?}", packages);

        let packages: Vec<&str> = packages.iter().map(|p| normalize_package(p)).collect();
        let actions: Vec<&TypeDef> = type_resolver
            .types()
            .filter(|def| def.attribute(REST_ACTION_ATTRIBUTE).is_some())
            .filter(|def| {
                packages.is_empty()
                    || packages
                        .iter()
                        .any(|package| in_package(&def.module_path, package))
            })
            .collect();

        debug!(
            "Detected actions: {:?}",
            actions.iter().map(|a| a.qualified_name()).collect::<Vec<_>>()
        );

        DetectionResult { actions }
    }
}

/// Strip a leading `crate::` and surrounding `::` from a configured package
fn normalize_package(package: &str) -> &str {
    let package = package.trim().trim_matches(':');
    if package == "crate" {
        return "";
    }
    package.strip_prefix("crate::").unwrap_or(package)
}

fn in_package(module_path: &str, package: &str) -> bool {
    package.is_empty()
        || module_path == package
        || module_path
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with("::"))
}
