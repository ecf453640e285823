//! Normalization of human-entered handles.
//!
//! The resolution core treats handles as opaque keys. Input typed by a person
//! (CLI arguments, the manual add command) goes through [`normalize_handle`]
//! first so that `"＠Foo Bar"` and `"@foobar"` land on the same cache entry.

use crate::domain::errors::HandleError;

/// Normalize a raw handle into its canonical `@lowercase` form.
///
/// Surrounding whitespace is trimmed, full-width at-signs are folded, all
/// whitespace and every `@` are removed, and the rest is lowercased and
/// prefixed with a single `@`.
pub fn normalize_handle(raw: &str) -> Result<String, HandleError> {
    let value: String = raw
        .trim()
        .chars()
        .map(|c| if c == '＠' { '@' } else { c })
        .filter(|c| !c.is_whitespace() && *c != '@')
        .collect();

    if value.is_empty() {
        return Err(HandleError::Empty(raw.to_string()));
    }

    Ok(format!("@{}", value.to_lowercase()))
}
