//! Working-set counts from free-text "sets" descriptions

use std::sync::LazyLock;

use regex::Regex;

/// Placeholders meaning "this item has no sets" (warm-ups, cardio, stretching)
const NO_SETS: &[&str] = &["—", "–", "-"];

/// An "N warm up set(s)" clause, anywhere in the text, up to the next `+` connector
static WARM_UP_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s*warm[- ]*up.*?(?:\+|$)").expect("valid warm-up pattern")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid number pattern"));

/// Count the working sets described by `sets`.
///
/// Warm-up clauses are dropped wherever they appear and the remaining
/// numbers are summed, so "1 warm up set + 3 + 1 AMRAP" gives 4 and
/// "3 sets + 1 warm up set" gives 3. Text that mentions a set without
/// any number counts as one set.
pub fn parse_set_count(sets: &str) -> u32 {
    let trimmed = sets.trim();
    if trimmed.is_empty() || NO_SETS.contains(&trimmed) {
        return 0;
    }

    let lowered = trimmed.to_lowercase();
    let working = WARM_UP_CLAUSE.replace_all(&lowered, "");

    let mut numbers = NUMBER.find_iter(&working).peekable();
    if numbers.peek().is_none() {
        return u32::from(working.contains("set"));
    }

    numbers
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .fold(0u32, u32::saturating_add)
}
