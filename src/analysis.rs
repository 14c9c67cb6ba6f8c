//! Text analysis for documents and natural-language queries.
//!
//! The index itself never normalizes tokens. An [`Analyzer`] is applied
//! once, before building and before natural-language lookups, so both sides
//! see the same token forms.
//!
//! # Examples
//!
//! ```
//! use quarry::analysis::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! assert_eq!(analyzer.analyze("Hello, World!"), vec!["hello", "world"]);
//! ```

use std::fmt::Debug;

use unicode_segmentation::UnicodeSegmentation;

/// Turns raw text into index tokens.
pub trait Analyzer: Send + Sync + Debug {
    /// Tokenize and normalize `text`.
    fn analyze(&self, text: &str) -> Vec<String>;

    /// Name of this analyzer.
    fn name(&self) -> &'static str;
}

/// Splits on Unicode word boundaries (UAX #29) and lowercases.
///
/// Punctuation and whitespace segments are dropped.
#[derive(Clone, Debug, Default)]
pub struct StandardAnalyzer {
    min_token_length: usize,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer.
    pub fn new() -> Self {
        StandardAnalyzer::default()
    }

    /// Drop tokens shorter than `min_token_length` characters.
    pub fn with_min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length;
        self
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(str::to_lowercase)
            .filter(|word| word.chars().count() >= self.min_token_length)
            .collect()
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

/// Splits on whitespace and keeps tokens as they are.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceAnalyzer;

impl WhitespaceAnalyzer {
    pub fn new() -> Self {
        WhitespaceAnalyzer
    }
}

impl Analyzer for WhitespaceAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
