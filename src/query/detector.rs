//! Query type detection.
//!
//! Recognizing a query type requires confirming it is well formed, so
//! detection is a fixed sequence of total predicates followed by a single
//! classification step:
//!
//! 1. global structure (quotes, parentheses, phrase lengths)
//! 2. unknown all-caps operators
//! 3. mixed query types
//! 4. proximity (`NEAR/<k>`)
//! 5. wildcard (`*`)
//! 6. boolean (operators or quotes)
//! 7. natural language
//!
//! Operator keywords are case-sensitive throughout.

use std::fmt;

use lazy_static::lazy_static;
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{MalformedReason, QuarryError, Result};

lazy_static! {
    static ref NEAR_PATTERN: Regex = Regex::new(r"NEAR/([0-9]+)").unwrap();
    static ref BOOLEAN_OPERATOR: Regex = Regex::new(r"\b(?:AND|OR|NOT)\b").unwrap();
    static ref QUOTED_PHRASE: Regex = Regex::new(r#""[^"]*""#).unwrap();
    static ref OPERATOR_LIKE: Regex = Regex::new(r"^[A-Z]{2,}$").unwrap();
}

/// Longest phrase (in tokens) accepted inside quotes.
pub const MAX_PHRASE_TOKENS: usize = 3;

/// The four mutually exclusive query syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// `AND`/`OR`/`NOT`, parentheses and quoted phrases.
    Boolean,
    /// A single `*` pattern such as `climat*`.
    Wildcard,
    /// `<left> NEAR/<k> <right>`.
    Proximity,
    /// Anything else; rewritten to an OR query.
    NaturalLanguage,
}

impl QueryType {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Boolean => "boolean",
            QueryType::Wildcard => "wildcard",
            QueryType::Proximity => "proximity",
            QueryType::NaturalLanguage => "natural_language",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies raw query strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryDetector;

impl QueryDetector {
    /// Create a new detector.
    pub fn new() -> Self {
        QueryDetector
    }

    /// Classify `query`, or reject it with [`QuarryError::MalformedQuery`].
    pub fn classify(&self, query: &str) -> Result<QueryType> {
        classify(query)
    }
}

/// Classify `query`, or reject it with [`QuarryError::MalformedQuery`].
pub fn classify(query: &str) -> Result<QueryType> {
    check_global_structure(query)?;

    if has_unknown_operator(query) {
        return Err(QuarryError::malformed(MalformedReason::UnknownOperator));
    }
    if has_mixed_types(query) {
        return Err(QuarryError::malformed(MalformedReason::MixedTypes));
    }

    if query.contains("NEAR") {
        if invalid_near(query) {
            return Err(QuarryError::malformed(MalformedReason::MalformedNear));
        }
        return Ok(QueryType::Proximity);
    }

    if query.contains('*') {
        if invalid_wildcard(query) {
            return Err(QuarryError::malformed(MalformedReason::MalformedWildcard));
        }
        return Ok(QueryType::Wildcard);
    }

    if BOOLEAN_OPERATOR.is_match(query) || query.contains('"') {
        validate_boolean(query)?;
        return Ok(QueryType::Boolean);
    }

    Ok(QueryType::NaturalLanguage)
}

/// Quote pairing, parenthesis balance and phrase length, in that order.
pub fn check_global_structure(query: &str) -> Result<()> {
    if has_unmatched_quotes(query) {
        return Err(QuarryError::malformed(MalformedReason::UnmatchedQuotes));
    }
    if !has_balanced_parens(query) {
        return Err(QuarryError::malformed(MalformedReason::UnbalancedParentheses));
    }
    if has_bad_phrase_length(query) {
        return Err(QuarryError::malformed(MalformedReason::BadPhraseLength));
    }
    Ok(())
}

/// Full boolean validation: global structure plus operator placement.
pub fn validate_boolean(query: &str) -> Result<()> {
    check_global_structure(query)?;
    if has_unknown_operator(query) {
        return Err(QuarryError::malformed(MalformedReason::UnknownOperator));
    }
    if invalid_boolean_structure(query) {
        return Err(QuarryError::malformed(MalformedReason::MalformedBoolean));
    }
    Ok(())
}

/// An odd number of `"` characters.
pub fn has_unmatched_quotes(query: &str) -> bool {
    query.matches('"').count() % 2 == 1
}

/// Every `)` closes an earlier `(` and none stay open.
pub fn has_balanced_parens(query: &str) -> bool {
    let mut depth: i64 = 0;
    for ch in query.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Some quoted phrase is empty or longer than [`MAX_PHRASE_TOKENS`].
pub fn has_bad_phrase_length(query: &str) -> bool {
    QUOTED_PHRASE.find_iter(query).any(|m| {
        let inside = m.as_str().trim_matches('"').trim();
        inside.is_empty() || inside.split_whitespace().count() > MAX_PHRASE_TOKENS
    })
}

/// Whether `token` is an operator keyword.
pub fn is_boolean_keyword(token: &str) -> bool {
    matches!(token, "AND" | "OR" | "NOT")
}

/// A whitespace token of two or more uppercase letters that is not a keyword.
pub fn has_unknown_operator(query: &str) -> bool {
    query
        .split_whitespace()
        .any(|token| OPERATOR_LIKE.is_match(token) && !is_boolean_keyword(token))
}

/// Wildcards combined with proximity, boolean operators or quotes, or
/// proximity combined with boolean operators.
///
/// Quotes alone do not conflict with `NEAR`, since quoted phrases are valid
/// proximity operands.
pub fn has_mixed_types(query: &str) -> bool {
    let has_star = query.contains('*');
    let has_near = query.contains("NEAR");
    let has_operators = BOOLEAN_OPERATOR.is_match(query);
    let has_quotes = query.contains('"');

    (has_star && (has_near || has_operators || has_quotes)) || (has_near && has_operators)
}

/// The single `NEAR/<k>` match of a query, if it is exactly one.
fn single_near_match(query: &str) -> Option<Match<'_>> {
    let mut matches = NEAR_PATTERN.find_iter(query);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}

/// `NEAR` present but not as exactly one `NEAR/<k>` with both operands.
pub fn invalid_near(query: &str) -> bool {
    if !query.contains("NEAR") {
        return false;
    }
    let Some(near) = single_near_match(query) else {
        return true;
    };

    let left = query[..near.start()].trim();
    let right = query[near.end()..].trim();
    left.is_empty() || right.is_empty()
}

/// A `*` query containing quotes or whitespace, or made only of stars.
pub fn invalid_wildcard(query: &str) -> bool {
    if !query.contains('*') {
        return false;
    }
    query.contains('"') || query.chars().any(char::is_whitespace) || query.chars().all(|c| c == '*')
}

/// Operator placement rules over whitespace-separated tokens.
pub fn invalid_boolean_structure(query: &str) -> bool {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return false;
    };

    let is_binary = |t: &str| t == "AND" || t == "OR";

    if is_boolean_keyword(last) || is_binary(first) {
        return true;
    }

    tokens.windows(2).any(|pair| {
        let (a, b) = (pair[0], pair[1]);
        (is_binary(a) && is_binary(b)) || (a == "NOT" && is_boolean_keyword(b))
    })
}
