//! Natural-language fallback.

/// Join the whitespace tokens of `query` with ` OR `.
///
/// Blank input yields an empty string.
pub fn to_boolean_or(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" OR ")
}

/// Join already-analyzed tokens with ` OR `.
pub fn tokens_to_boolean_or<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" OR ")
}
