use crate::extractor::HttpMethod;

/// Reason a discovered REST action was left out of the generated document.
///
/// None of these abort a run: the action is skipped with a warning and
/// generation continues with the remaining actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The type name does not carry the `RestAction` suffix
    MissingSuffix { type_name: String },
    /// `RestAction<Model, Response>` could not be bound to exactly two concrete types
    UnresolvedGenerics { type_name: String, resolved: usize },
    /// The `#[rest_action(..)]` attribute names something that is not an HTTP method
    UnrecognizedMethod { type_name: String, value: String },
    /// A valid HTTP method that has no document mapping (only GET and POST do)
    UnsupportedMethod { type_name: String, method: HttpMethod },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SkipReason::MissingSuffix { type_name } => {
                write!(f, "RestAction suffix missing in {}. Skipping type.", type_name)
            }
            SkipReason::UnresolvedGenerics {
                type_name,
                resolved,
            } => write!(
                f,
                "Could not resolve request model and response entity types of {} ({} of 2 resolved). Skipping type.",
                type_name, resolved
            ),
            SkipReason::UnrecognizedMethod { type_name, value } => {
                write!(f, "Unrecognized HTTP method '{}' on {}. Skipping type.", value, type_name)
            }
            SkipReason::UnsupportedMethod { type_name, method } => {
                write!(f, "Unsupported method: {} on {}. Skipping type.", method, type_name)
            }
        }
    }
}

impl std::error::Error for SkipReason {}
