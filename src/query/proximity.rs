//! `NEAR/k` evaluation over stored positions.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::error::{MalformedReason, QuarryError, Result};
use crate::index::key::TermKey;
use crate::index::package::{DocId, IndexReader, Position};
use crate::query::detector::MAX_PHRASE_TOKENS;
use crate::query::postings::intersect_sorted;

lazy_static! {
    static ref NEAR_OPERATOR: Regex = Regex::new(r"\bNEAR/([0-9]+)\b").unwrap();
}

/// An occurrence of a term or phrase, as an inclusive token range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// First token (inclusive)
    pub start: Position,
    /// Last token (inclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Span of a key of `arity` tokens starting at `start`.
    pub fn for_key(start: Position, arity: usize) -> Self {
        let width = arity.saturating_sub(1) as Position;
        Span::new(start, start.saturating_add(width))
    }

    /// Check if this span shares a token with another span.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Gap between two spans; 0 when they overlap, 1 when adjacent.
    pub fn distance_to(&self, other: &Span) -> u32 {
        if self.overlaps(other) {
            0
        } else {
            other
                .start
                .abs_diff(self.end)
                .min(self.start.abs_diff(other.end))
        }
    }
}

/// A parsed `<left> NEAR/<k> <right>` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityQuery {
    pub left: TermKey,
    pub right: TermKey,
    pub max_distance: u32,
}

impl ProximityQuery {
    /// Parse a proximity query, re-checking its structure.
    pub fn parse(query: &str) -> Result<Self> {
        let mut matches = NEAR_OPERATOR.captures_iter(query);
        let (Some(near), None) = (matches.next(), matches.next()) else {
            return Err(QuarryError::malformed(MalformedReason::MalformedNear));
        };

        let (Some(whole), Some(digits)) = (near.get(0), near.get(1)) else {
            return Err(QuarryError::malformed(MalformedReason::MalformedNear));
        };
        // Positions are u32, so any larger k already covers every span.
        let max_distance = digits.as_str().parse::<u32>().unwrap_or(u32::MAX);

        let left = query[..whole.start()].trim();
        let right = query[whole.end()..].trim();
        if left.is_empty() || right.is_empty() {
            return Err(QuarryError::malformed(MalformedReason::MalformedNear));
        }

        Ok(ProximityQuery {
            left: operand_key(left)?,
            right: operand_key(right)?,
            max_distance,
        })
    }
}

/// A quoted operand becomes its phrase; anything else is one term.
fn operand_key(operand: &str) -> Result<TermKey> {
    let quoted = operand.len() >= 2 && operand.starts_with('"') && operand.ends_with('"');
    if !quoted {
        return Ok(TermKey::term(operand));
    }

    let tokens: Vec<&str> = operand[1..operand.len() - 1].split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > MAX_PHRASE_TOKENS {
        return Err(QuarryError::malformed(MalformedReason::BadPhraseLength));
    }
    Ok(TermKey::from_tokens(tokens))
}

/// Evaluates proximity queries against an index.
#[derive(Debug, Clone, Copy)]
pub struct ProximityEvaluator<'a> {
    reader: &'a dyn IndexReader,
}

impl<'a> ProximityEvaluator<'a> {
    pub fn new(reader: &'a dyn IndexReader) -> Self {
        ProximityEvaluator { reader }
    }

    /// Parse and evaluate `query`.
    pub fn evaluate(&self, query: &str) -> Result<BTreeSet<DocId>> {
        let parsed = ProximityQuery::parse(query)?;
        Ok(self.evaluate_query(&parsed))
    }

    /// Documents holding both operands within `max_distance` of each other.
    pub fn evaluate_query(&self, query: &ProximityQuery) -> BTreeSet<DocId> {
        let candidates = intersect_sorted(
            self.reader.posting_list(&query.left),
            self.reader.posting_list(&query.right),
        );

        let hits: BTreeSet<DocId> = candidates
            .into_iter()
            .filter(|&doc_id| self.within_distance(query, doc_id))
            .collect();

        debug!(
            "{} NEAR/{} {}: {} documents",
            query.left,
            query.max_distance,
            query.right,
            hits.len()
        );
        hits
    }

    fn spans(&self, key: &TermKey, doc_id: DocId) -> Vec<Span> {
        let arity = key.arity();
        self.reader
            .term_positions(key, doc_id)
            .iter()
            .map(|&start| Span::for_key(start, arity))
            .collect()
    }

    fn within_distance(&self, query: &ProximityQuery, doc_id: DocId) -> bool {
        let left = self.spans(&query.left, doc_id);
        let right = self.spans(&query.right, doc_id);

        left.iter().any(|a| {
            right
                .iter()
                .any(|b| a != b && a.distance_to(b) <= query.max_distance)
        })
    }
}
