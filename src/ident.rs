//! Exercise identifiers derived from display names

use std::sync::LazyLock;

use regex::Regex;

/// Separator used between alphanumeric runs
pub const SEPARATOR: char = '_';

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid identifier pattern"));

/// Derive a key- and path-safe identifier from a display name.
///
/// "Hip Thrust" becomes `hip_thrust`, "RDLs (Romanian Deadlifts)" becomes
/// `rdls_romanian_deadlifts`. An input without any ASCII alphanumerics
/// yields an empty string, which callers must not store.
pub fn exercise_id(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches(SEPARATOR)
        .to_string()
}

/// Like [`exercise_id`] but `None` for names that normalize to nothing
pub fn try_exercise_id(name: &str) -> Option<String> {
    let id = exercise_id(name);
    (!id.is_empty()).then_some(id)
}
