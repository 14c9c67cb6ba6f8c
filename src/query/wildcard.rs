//! Wildcard expansion through the character n-gram map.
//!
//! A pattern such as `clim*te` is reduced to boundary grams of its stems and
//! the n-grams of its literal core. Intersecting their term lists gives a
//! small candidate set, which is then checked against the full glob before
//! the postings of the survivors are merged.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use regex::Regex;

use crate::error::{QuarryError, Result};
use crate::index::builder::BOUNDARY;
use crate::index::key::TermKey;
use crate::index::package::{DocId, IndexReader, MAX_CHAR_NGRAM};
use crate::query::postings::intersect_terms;

/// A validated, compiled `*` pattern.
///
/// `*` matches any run of characters, possibly empty. Every other character
/// is literal.
#[derive(Clone)]
pub struct WildcardPattern {
    pattern: String,
    regex: Regex,
}

impl fmt::Debug for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WildcardPattern")
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl WildcardPattern {
    /// Compile `pattern`. Rejects patterns without `*`, patterns made only
    /// of stars, and patterns containing whitespace or quotes.
    pub fn new(pattern: &str) -> Result<Self> {
        if !pattern.contains('*') {
            return Err(QuarryError::invalid_argument(format!(
                "Not a wildcard pattern: {pattern:?}"
            )));
        }
        if pattern.chars().all(|c| c == '*') {
            return Err(QuarryError::invalid_argument(
                "Wildcard pattern has no literal characters",
            ));
        }
        if pattern.contains('"') || pattern.chars().any(char::is_whitespace) {
            return Err(QuarryError::invalid_argument(format!(
                "Invalid wildcard pattern: {pattern:?}"
            )));
        }

        let regex = Self::compile_pattern(pattern)?;
        Ok(WildcardPattern {
            pattern: pattern.to_string(),
            regex,
        })
    }

    fn compile_pattern(pattern: &str) -> Result<Regex> {
        let mut regex_pattern = String::from("^");
        let segments: Vec<String> = pattern.split('*').map(regex::escape).collect();
        regex_pattern.push_str(&segments.join(".*"));
        regex_pattern.push('$');

        Regex::new(&regex_pattern)
            .map_err(|e| QuarryError::invalid_argument(format!("Invalid wildcard pattern: {e}")))
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether a whole term matches the pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }

    /// Character n-grams a candidate term is looked up by, in lookup order.
    ///
    /// Anchored grams come first: `$` plus the first one and two characters
    /// unless the pattern starts with `*`, then the last one and two
    /// characters plus `$` unless it ends with `*`. Then every substring of
    /// length 3, 2 and 1 of the core, the pattern with every `*` removed.
    pub fn required_grams(&self) -> Vec<String> {
        let segments: Vec<Vec<char>> = self
            .pattern
            .split('*')
            .map(|s| s.chars().collect())
            .collect();
        let core: Vec<char> = segments.concat();
        let mut grams: Vec<String> = Vec::new();

        if let Some(first) = segments.first().filter(|s| !s.is_empty()) {
            for len in 1..=first.len().min(2) {
                let mut gram = String::from(BOUNDARY);
                gram.extend(&first[..len]);
                grams.push(gram);
            }
        }

        if let Some(last) = segments.last().filter(|s| !s.is_empty()) {
            for len in 1..=last.len().min(2) {
                let mut gram: String = last[last.len() - len..].iter().collect();
                gram.push(BOUNDARY);
                grams.push(gram);
            }
        }

        for n in (1..=MAX_CHAR_NGRAM).rev() {
            for window in core.windows(n) {
                grams.push(window.iter().collect());
            }
        }

        let boundary = BOUNDARY.to_string();
        let mut seen = BTreeSet::new();
        grams.retain(|g| *g != boundary && seen.insert(g.clone()));
        grams
    }
}

/// Expands wildcard patterns and collects their documents.
#[derive(Debug, Clone, Copy)]
pub struct WildcardEvaluator<'a> {
    reader: &'a dyn IndexReader,
}

impl<'a> WildcardEvaluator<'a> {
    pub fn new(reader: &'a dyn IndexReader) -> Self {
        WildcardEvaluator { reader }
    }

    /// Ascending indexed terms matching `pattern`. Invalid patterns expand
    /// to nothing.
    pub fn expand(&self, pattern: &str) -> Vec<String> {
        match WildcardPattern::new(pattern) {
            Ok(compiled) => self.expand_pattern(&compiled),
            Err(e) => {
                debug!("wildcard {pattern:?} expands to nothing: {e}");
                Vec::new()
            }
        }
    }

    /// Ascending indexed terms matching a compiled pattern.
    pub fn expand_pattern(&self, pattern: &WildcardPattern) -> Vec<String> {
        let grams = pattern.required_grams();
        let mut grams = grams.iter();

        let Some(first) = grams.next() else {
            return Vec::new();
        };
        let mut candidates = self.reader.wildcard_matches(first).to_vec();
        for gram in grams {
            if candidates.is_empty() {
                break;
            }
            candidates = intersect_terms(&candidates, self.reader.wildcard_matches(gram));
        }

        candidates.retain(|term| pattern.matches(term));
        debug!(
            "wildcard {:?} expanded to {} terms",
            pattern.pattern(),
            candidates.len()
        );
        candidates
    }

    /// Union of the postings of every matching term.
    pub fn evaluate(&self, pattern: &str) -> BTreeSet<DocId> {
        self.union_postings(&self.expand(pattern))
    }

    /// Union of the postings of already expanded terms.
    pub fn union_postings(&self, terms: &[String]) -> BTreeSet<DocId> {
        let mut docs = BTreeSet::new();
        for term in terms {
            docs.extend(self.reader.posting_list(&TermKey::term(term.as_str())).iter().copied());
        }
        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, IndexPackage};

    fn corpus() -> IndexPackage {
        IndexBuilder::build(
            &[
                vec!["climate", "change"],
                vec!["climatic", "shift"],
                vec!["learning", "machines"],
                vec!["climb", "learnings"],
            ],
            Some(&[10, 20, 30, 40]),
        )
        .unwrap()
    }

    #[test]
    fn test_required_grams_for_prefix() {
        let pattern = WildcardPattern::new("clim*").unwrap();
        assert_eq!(
            pattern.required_grams(),
            vec!["$c", "$cl", "cli", "lim", "cl", "li", "im", "c", "l", "i", "m"]
        );
    }

    #[test]
    fn test_core_grams_join_segments() {
        let pattern = WildcardPattern::new("ab*cd").unwrap();
        assert_eq!(
            pattern.required_grams(),
            vec![
                "$a", "$ab", "d$", "cd$", "abc", "bcd", "ab", "bc", "cd", "a", "b", "c", "d"
            ]
        );
    }

    #[test]
    fn test_prefix_suffix_and_infix() {
        let package = corpus();
        let evaluator = WildcardEvaluator::new(&package);

        assert_eq!(evaluator.expand("climat*"), vec!["climate", "climatic"]);
        assert_eq!(
            evaluator.evaluate("climat*").into_iter().collect::<Vec<_>>(),
            vec![10, 20]
        );
        assert_eq!(evaluator.expand("*ing"), vec!["learning"]);
        assert_eq!(evaluator.expand("learn*ing"), vec!["learning"]);
        assert_eq!(evaluator.expand("*arn*"), vec!["learning", "learnings"]);
        assert_eq!(evaluator.expand("cli*mb"), vec!["climb"]);
        assert!(evaluator.expand("c*b").is_empty());
    }

    #[test]
    fn test_infix_star_requires_core_grams() {
        let package =
            IndexBuilder::build(&[vec!["learnabcing"], vec!["learning"]], None).unwrap();
        let evaluator = WildcardEvaluator::new(&package);
        // The core "learning" needs "ni", which "learnabcing" lacks.
        assert!(package.wildcard_matches("ni").iter().all(|t| t != "learnabcing"));
        assert_eq!(evaluator.expand("learn*ing"), vec!["learning"]);
        assert_eq!(
            evaluator.evaluate("learn*ing").into_iter().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn test_invalid_patterns_expand_to_nothing() {
        let package = corpus();
        let evaluator = WildcardEvaluator::new(&package);
        assert!(evaluator.evaluate("*").is_empty());
        assert!(evaluator.evaluate("climate").is_empty());
        assert!(evaluator.evaluate("clim* change").is_empty());
        assert!(evaluator.evaluate("").is_empty());
        assert!(evaluator.evaluate("zzz*").is_empty());
    }

    #[test]
    fn test_regex_characters_are_literal() {
        let package = IndexBuilder::build(&[vec!["a.c", "abc"]], None).unwrap();
        let evaluator = WildcardEvaluator::new(&package);
        assert_eq!(evaluator.expand("a.*"), vec!["a.c"]);
    }
}
