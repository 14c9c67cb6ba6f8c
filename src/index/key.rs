//! Lookup keys shared by the postings and proximity maps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single indexed token or a contiguous token n-gram.
///
/// Keys of different arity never compare equal: `Term("a")` and
/// `Phrase(["a"])` are distinct, which is why [`TermKey::from_tokens`]
/// always maps one-token input to `Term`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TermKey {
    /// A unigram.
    Term(String),
    /// An ordered n-gram of two or three tokens.
    Phrase(Vec<String>),
}

impl TermKey {
    /// Create a unigram key.
    pub fn term<S: Into<String>>(token: S) -> Self {
        TermKey::Term(token.into())
    }

    /// Create a key from a token sequence.
    ///
    /// One token yields `Term`; anything else (including zero tokens) yields
    /// `Phrase`. An empty phrase is never stored, so it always resolves to
    /// empty postings.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.len() == 1 {
            TermKey::Term(tokens.remove(0))
        } else {
            TermKey::Phrase(tokens)
        }
    }

    /// Number of tokens covered by this key.
    pub fn arity(&self) -> usize {
        match self {
            TermKey::Term(_) => 1,
            TermKey::Phrase(tokens) => tokens.len(),
        }
    }

    /// The tokens making up this key, in order.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            TermKey::Term(token) => vec![token.as_str()],
            TermKey::Phrase(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for TermKey {
    fn from(token: &str) -> Self {
        TermKey::Term(token.to_string())
    }
}

impl From<String> for TermKey {
    fn from(token: String) -> Self {
        TermKey::Term(token)
    }
}

impl From<&[&str]> for TermKey {
    fn from(tokens: &[&str]) -> Self {
        TermKey::from_tokens(tokens.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for TermKey {
    fn from(tokens: [&str; N]) -> Self {
        TermKey::from_tokens(tokens)
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKey::Term(token) => write!(f, "{token}"),
            TermKey::Phrase(tokens) => write!(f, "\"{}\"", tokens.join(" ")),
        }
    }
}
