//! Postal code normalization.
//!
//! Incoming codes are free-form strings (`" 90210-1234 "`, `"10001"`). Before
//! a dataset lookup they are reduced to the 5-character form used as the
//! dataset key.

/// Number of leading characters kept from a postal code.
pub const POSTAL_CODE_LEN: usize = 5;

/// Normalize a postal code for dataset lookup.
///
/// Trims surrounding whitespace and keeps at most the first
/// [`POSTAL_CODE_LEN`] characters. Returns `None` when nothing is left after
/// trimming.
///
/// # Examples
///
/// ```
/// use zipdist::postal::normalize_postal_code;
///
/// assert_eq!(normalize_postal_code("90210"), Some("90210"));
/// assert_eq!(normalize_postal_code("  90210-1234 "), Some("90210"));
/// assert_eq!(normalize_postal_code("123"), Some("123"));
/// assert_eq!(normalize_postal_code("   "), None);
/// ```
pub fn normalize_postal_code(code: &str) -> Option<&str> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Cut on a character boundary, not a byte offset
    let end = trimmed
        .char_indices()
        .nth(POSTAL_CODE_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());

    Some(&trimmed[..end])
}

/// Canonical dataset key for an already-normalized code.
///
/// Keys are stored upper-cased so alphanumeric codes match regardless of case.
pub fn dataset_key(code: &str) -> String {
    code.to_uppercase()
}
