//! Error types for the Quarry library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`QuarryError`] enum. Absent index keys are never errors: lookups return
//! empty collections instead.
//!
//! # Examples
//!
//! ```
//! use quarry::error::{QuarryError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(QuarryError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;
use std::io;

use thiserror::Error;

/// Why a query string was rejected by the detector or an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// An odd number of `"` characters.
    UnmatchedQuotes,
    /// Parentheses do not balance.
    UnbalancedParentheses,
    /// A quoted phrase is empty or longer than three tokens.
    BadPhraseLength,
    /// An all-uppercase token that is not `AND`, `OR`, `NOT` or `NEAR/<k>`.
    UnknownOperator,
    /// Wildcard, proximity and boolean syntax combined in one query.
    MixedTypes,
    /// `NEAR` is present but not as exactly one well-formed `NEAR/<k>`.
    MalformedNear,
    /// A `*` query with quotes, whitespace, or nothing but stars.
    MalformedWildcard,
    /// Operator placement violates the boolean grammar.
    MalformedBoolean,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MalformedReason::UnmatchedQuotes => "unmatched quotes",
            MalformedReason::UnbalancedParentheses => "unbalanced parentheses",
            MalformedReason::BadPhraseLength => "phrase is empty or exceeds 3 tokens",
            MalformedReason::UnknownOperator => "unknown operator",
            MalformedReason::MixedTypes => {
                "mixed query types (wildcard/boolean/proximity) are not supported"
            }
            MalformedReason::MalformedNear => "malformed NEAR/k",
            MalformedReason::MalformedWildcard => "malformed wildcard query",
            MalformedReason::MalformedBoolean => "malformed boolean query",
        };
        f.write_str(msg)
    }
}

/// The main error type for Quarry operations.
#[derive(Error, Debug)]
pub enum QuarryError {
    /// Builder input where the document list and ID list differ in length.
    #[error("Shape mismatch: {docs} documents but {ids} document ids")]
    ShapeMismatch { docs: usize, ids: usize },

    /// A persisted package path that does not exist.
    #[error("Index package not found: {0}")]
    NotFound(String),

    /// Persisted data that does not decode into an index package.
    #[error("Corrupt index package: {0}")]
    Corrupt(String),

    /// A query string that fails structural validation.
    #[error("Malformed query: {0}")]
    MalformedQuery(MalformedReason),

    /// Boolean evaluation stack underflow or leftover operands.
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with QuarryError.
pub type Result<T> = std::result::Result<T, QuarryError>;

impl QuarryError {
    /// Create a new shape mismatch error.
    pub fn shape_mismatch(docs: usize, ids: usize) -> Self {
        QuarryError::ShapeMismatch { docs, ids }
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        QuarryError::NotFound(path.into())
    }

    /// Create a new corrupt package error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        QuarryError::Corrupt(msg.into())
    }

    /// Create a new malformed query error.
    pub fn malformed(reason: MalformedReason) -> Self {
        QuarryError::MalformedQuery(reason)
    }

    /// Create a new malformed expression error.
    pub fn expression<S: Into<String>>(msg: S) -> Self {
        QuarryError::MalformedExpression(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        QuarryError::Storage(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        QuarryError::InvalidArgument(msg.into())
    }

    /// The malformed-query reason, if this is a query rejection.
    pub fn malformed_reason(&self) -> Option<MalformedReason> {
        match self {
            QuarryError::MalformedQuery(reason) => Some(*reason),
            _ => None,
        }
    }
}
