//! Table name normalization
//!
//! Raw table text pulled out of a token stream may still carry an alias
//! (`users u`, `users as u`) and identifier quoting (`"Users"`). Normalization
//! reduces it to the canonical lowercase `schema.table` or bare `table` form.
//! Names are case-folded the way PostgreSQL folds unquoted identifiers.

const QUOTE_CHARS: [char; 2] = ['"', '\''];

/// Normalize a raw table reference to its canonical key.
///
/// Malformed input is passed through after stripping; an empty result means
/// the text carried no usable name.
pub fn normalize_table_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let without_alias = if let Some(idx) = lowered.find(" as ") {
        &lowered[..idx]
    } else if let Some(idx) = lowered.find(' ') {
        &lowered[..idx]
    } else {
        lowered.as_str()
    };

    let stripped = without_alias.trim().trim_matches(&QUOTE_CHARS[..]);
    if !stripped.contains('.') {
        return stripped.to_string();
    }

    stripped
        .split('.')
        .map(|part| part.trim_matches(&QUOTE_CHARS[..]))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
