//! Single-pass construction of the unified, wildcard and proximity maps.
//!
//! Every document is visited once. For each token n-gram (n = 1..3) the
//! builder records the document in the key's postings set and the start
//! offset in the key's per-document position list. Each distinct token also
//! contributes its boundary-augmented character n-grams to the wildcard map.
//! [`IndexBuilder::finish`] then sorts every set into its final list form.

use std::collections::BTreeMap;

use ahash::AHashSet;
use log::{debug, info};

use crate::error::{QuarryError, Result};
use crate::index::key::TermKey;
use crate::index::package::{
    DocId, FastMap, IndexMetadata, IndexPackage, Position, MAX_CHAR_NGRAM, MAX_TOKEN_NGRAM,
    PACKAGE_VERSION,
};

/// Boundary marker wrapped around terms for character n-grams.
pub const BOUNDARY: char = '$';

/// Accumulates documents and produces an [`IndexPackage`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    unified: FastMap<TermKey, AHashSet<DocId>>,
    proximity: FastMap<TermKey, FastMap<DocId, Vec<Position>>>,
    wildcard: FastMap<String, AHashSet<String>>,
    doc_lengths: BTreeMap<DocId, u32>,
    doc_count: u64,
    total_tokens: u64,
}

impl IndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a package from tokenized documents.
    ///
    /// When `doc_ids` is `None` documents are numbered 0, 1, 2, ... in input
    /// order. Fails with [`QuarryError::ShapeMismatch`] if the ID list length
    /// differs from the document count.
    pub fn build<D, S>(tokenized_docs: &[D], doc_ids: Option<&[DocId]>) -> Result<IndexPackage>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let ids: Vec<DocId> = match doc_ids {
            Some(ids) if ids.len() != tokenized_docs.len() => {
                return Err(QuarryError::shape_mismatch(tokenized_docs.len(), ids.len()));
            }
            Some(ids) => ids.to_vec(),
            None => (0..tokenized_docs.len() as DocId).collect(),
        };

        let mut builder = IndexBuilder::new();
        for (tokens, doc_id) in tokenized_docs.iter().zip(ids) {
            builder.add_document(doc_id, tokens.as_ref())?;
        }
        Ok(builder.finish())
    }

    /// Index one document. Fails with [`QuarryError::InvalidArgument`] if
    /// the document has more tokens than a [`Position`] can address.
    pub fn add_document<S: AsRef<str>>(&mut self, doc_id: DocId, tokens: &[S]) -> Result<()> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let length = document_length(tokens.len())?;

        self.doc_count += 1;
        self.total_tokens += u64::from(length);
        self.doc_lengths.insert(doc_id, length);

        for (key, position) in token_ngrams(&tokens, MAX_TOKEN_NGRAM) {
            self.unified.entry(key.clone()).or_default().insert(doc_id);
            self.proximity
                .entry(key)
                .or_default()
                .entry(doc_id)
                .or_default()
                .push(position);
        }

        let distinct: AHashSet<&str> = tokens.iter().copied().collect();
        for term in distinct {
            for gram in char_ngrams(term, MAX_CHAR_NGRAM) {
                self.wildcard
                    .entry(gram)
                    .or_default()
                    .insert(term.to_string());
            }
        }

        debug!("indexed document {doc_id} ({length} tokens)");
        Ok(())
    }

    /// Finalize into an immutable package with sorted, duplicate-free lists.
    pub fn finish(self) -> IndexPackage {
        let avgdl = if self.doc_count > 0 {
            self.total_tokens as f64 / self.doc_count as f64
        } else {
            0.0
        };

        let unified: FastMap<TermKey, Vec<DocId>> = self
            .unified
            .into_iter()
            .map(|(key, docs)| {
                let mut docs: Vec<DocId> = docs.into_iter().collect();
                docs.sort_unstable();
                (key, docs)
            })
            .collect();

        let wildcard: FastMap<String, Vec<String>> = self
            .wildcard
            .into_iter()
            .map(|(gram, terms)| {
                let mut terms: Vec<String> = terms.into_iter().collect();
                terms.sort_unstable();
                (gram, terms)
            })
            .collect();

        // Already ascending per document unless a caller reused a doc id.
        let mut proximity = self.proximity;
        for positions in proximity.values_mut().flat_map(|docs| docs.values_mut()) {
            positions.sort_unstable();
            positions.dedup();
        }

        info!(
            "built index package: {} documents, {} keys, {} char grams, avgdl {:.3}",
            self.doc_count,
            unified.len(),
            wildcard.len(),
            avgdl
        );

        IndexPackage {
            metadata: IndexMetadata {
                doc_count: Some(self.doc_count),
                avgdl: Some(avgdl),
                doc_lengths: self.doc_lengths,
                version: PACKAGE_VERSION.to_string(),
                ngrams_max: MAX_TOKEN_NGRAM,
                char_ngrams_max: MAX_CHAR_NGRAM,
            },
            unified,
            wildcard,
            proximity,
        }
    }
}

/// Token count of a document as a [`Position`].
pub fn document_length(len: usize) -> Result<Position> {
    Position::try_from(len).map_err(|_| {
        QuarryError::invalid_argument(format!(
            "Document has {len} tokens, more than {} are not addressable",
            Position::MAX
        ))
    })
}

/// Token n-grams of length 1..=`n_max` with their start offsets.
///
/// Stops at the first `n` longer than the document since every larger `n`
/// is too long as well. Offsets past [`Position::MAX`] saturate.
pub fn token_ngrams(tokens: &[&str], n_max: usize) -> Vec<(TermKey, Position)> {
    let mut grams = Vec::new();
    for n in 1..=n_max {
        if tokens.len() < n {
            break;
        }
        for (i, window) in tokens.windows(n).enumerate() {
            let position = Position::try_from(i).unwrap_or(Position::MAX);
            grams.push((TermKey::from_tokens(window.iter().copied()), position));
        }
    }
    grams
}

/// Character n-grams of `$term$` with length 1..=`n_max`, without the bare `$`.
pub fn char_ngrams(term: &str, n_max: usize) -> Vec<String> {
    let augmented: Vec<char> = std::iter::once(BOUNDARY)
        .chain(term.chars())
        .chain(std::iter::once(BOUNDARY))
        .collect();

    let mut grams = Vec::new();
    for n in 1..=n_max {
        for window in augmented.windows(n) {
            if n == 1 && window[0] == BOUNDARY {
                continue;
            }
            grams.push(window.iter().collect());
        }
    }
    grams
}
