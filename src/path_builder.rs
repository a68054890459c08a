//! Route paths derived from action type names.

use log::warn;

/// Suffix every REST action type name must carry
pub const REST_ACTION_SUFFIX: &str = "RestAction";

/// Build the route of an action: `ListUsersRestAction` in artifact `shop` becomes
/// `/apps/shop/bin/list-users.action`.
///
/// The last occurrence of [`REST_ACTION_SUFFIX`] and anything after it is cut off. Returns
/// `None`, with a warning, when the suffix is missing or nothing precedes it.
pub fn build_path(simple_name: &str, artifact_id: &str) -> Option<String> {
    let Some(suffix_start) = simple_name.rfind(REST_ACTION_SUFFIX) else {
        warn!("{} suffix missing in {}. Skipping type.", REST_ACTION_SUFFIX, simple_name);
        return None;
    };

    let name = &simple_name[..suffix_start];
    if name.is_empty() {
        warn!("Nothing precedes the {} suffix in {}. Skipping type.", REST_ACTION_SUFFIX, simple_name);
        return None;
    }

    Some(format!(
        "/apps/{}/bin/{}.action",
        artifact_id,
        to_lower_hyphen(name)
    ))
}

/// Convert PascalCase to lower-hyphen case: a hyphen goes before each uppercase letter
/// that follows a lowercase letter or digit, then everything is lowercased.
pub fn to_lower_hyphen(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase()
            && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            result.push('-');
        }
        result.extend(c.to_lowercase());
        previous = Some(c);
    }
    result
}
