//! The immutable index package and its read interface.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::index::key::TermKey;

/// Caller-supplied document identifier.
pub type DocId = u64;

/// Zero-based token offset inside a document.
pub type Position = u32;

/// Hash map keyed with ahash, used for every lookup table in a package.
pub type FastMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Current package format label.
pub const PACKAGE_VERSION: &str = "1.0";

/// Maximum token n-gram length indexed by the builder.
pub const MAX_TOKEN_NGRAM: usize = 3;

/// Maximum character n-gram length indexed for wildcard lookup.
pub const MAX_CHAR_NGRAM: usize = 3;

/// Corpus statistics recorded at build time.
///
/// `doc_count` and `avgdl` are optional so packages written without them
/// still load; [`IndexMetadata::resolved_doc_count`] and
/// [`IndexMetadata::resolved_avgdl`] fall back to `doc_lengths`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Number of documents (N).
    pub doc_count: Option<u64>,

    /// Average document length in tokens.
    pub avgdl: Option<f64>,

    /// Token count of every document.
    pub doc_lengths: BTreeMap<DocId, u32>,

    /// Package format label.
    pub version: String,

    /// Token n-gram maximum used at build time.
    pub ngrams_max: usize,

    /// Character n-gram maximum used at build time.
    pub char_ngrams_max: usize,
}

impl Default for IndexMetadata {
    fn default() -> Self {
        IndexMetadata {
            doc_count: Some(0),
            avgdl: Some(0.0),
            doc_lengths: BTreeMap::new(),
            version: PACKAGE_VERSION.to_string(),
            ngrams_max: MAX_TOKEN_NGRAM,
            char_ngrams_max: MAX_CHAR_NGRAM,
        }
    }
}

impl IndexMetadata {
    /// N, or the number of recorded document lengths when N is absent.
    pub fn resolved_doc_count(&self) -> u64 {
        self.doc_count
            .unwrap_or(self.doc_lengths.len() as u64)
    }

    /// avgdl, or the mean recorded document length when avgdl is absent.
    pub fn resolved_avgdl(&self) -> f64 {
        match self.avgdl {
            Some(avgdl) => avgdl,
            None if self.doc_lengths.is_empty() => 0.0,
            None => {
                let total: u64 = self.doc_lengths.values().map(|&len| len as u64).sum();
                total as f64 / self.doc_lengths.len() as f64
            }
        }
    }

    /// Stored token count of a document, if known.
    pub fn doc_length(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lengths.get(&doc_id).copied()
    }
}

/// Read access to a built index.
///
/// Every lookup returns an empty slice for unknown keys; "not indexed" is a
/// normal outcome, never an error.
pub trait IndexReader: Send + Sync + Debug {
    /// Ascending document IDs containing `key` as a contiguous n-gram.
    fn posting_list(&self, key: &TermKey) -> &[DocId];

    /// Lexicographically ascending terms whose `$term$` form contains `gram`.
    fn wildcard_matches(&self, gram: &str) -> &[String];

    /// Ascending start offsets of `key` inside `doc_id`.
    fn term_positions(&self, key: &TermKey, doc_id: DocId) -> &[Position];

    /// Corpus statistics.
    fn metadata(&self) -> &IndexMetadata;

    /// Occurrences of `key` inside `doc_id`.
    fn term_frequency(&self, key: &TermKey, doc_id: DocId) -> usize {
        self.term_positions(key, doc_id).len()
    }

    /// Number of documents containing `key`.
    fn doc_frequency(&self, key: &TermKey) -> usize {
        self.posting_list(key).len()
    }
}

/// An immutable bundle of metadata, postings, wildcard and proximity maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexPackage {
    /// Corpus statistics.
    pub metadata: IndexMetadata,

    /// Key -> ascending document IDs.
    pub unified: FastMap<TermKey, Vec<DocId>>,

    /// Character n-gram -> ascending terms.
    pub wildcard: FastMap<String, Vec<String>>,

    /// Key -> document -> ascending start positions.
    pub proximity: FastMap<TermKey, FastMap<DocId, Vec<Position>>>,
}

impl IndexPackage {
    /// Number of distinct token keys (all arities).
    pub fn key_count(&self) -> usize {
        self.unified.len()
    }

    /// Number of distinct character n-grams.
    pub fn gram_count(&self) -> usize {
        self.wildcard.len()
    }
}

impl IndexReader for IndexPackage {
    fn posting_list(&self, key: &TermKey) -> &[DocId] {
        self.unified.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn wildcard_matches(&self, gram: &str) -> &[String] {
        self.wildcard.get(gram).map(Vec::as_slice).unwrap_or(&[])
    }

    fn term_positions(&self, key: &TermKey, doc_id: DocId) -> &[Position] {
        self.proximity
            .get(key)
            .and_then(|docs| docs.get(&doc_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }
}
