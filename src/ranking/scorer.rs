//! Term weighting functions.

use std::fmt::Debug;

use crate::index::package::IndexMetadata;

/// Corpus-level statistics shared by every term of a ranking call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    /// Number of documents (N).
    pub doc_count: f64,
    /// Average document length. Zero or negative disables BM25 length
    /// normalization.
    pub avgdl: f64,
}

impl CorpusStats {
    /// Resolve statistics from package metadata, deriving missing fields
    /// from the stored document lengths.
    pub fn from_metadata(metadata: &IndexMetadata) -> Self {
        CorpusStats {
            doc_count: metadata.resolved_doc_count() as f64,
            avgdl: metadata.resolved_avgdl(),
        }
    }
}

/// A per-term relevance function.
///
/// A document's score is the sum of [`Scorer::term_score`] over the query
/// terms. Terms absent from the corpus (`doc_freq == 0`) and terms absent
/// from the document (`term_freq == 0`) contribute nothing.
pub trait Scorer: Send + Sync + Debug {
    /// Inverse document frequency of a term found in `doc_freq` documents.
    fn idf(&self, doc_freq: usize, stats: &CorpusStats) -> f64;

    /// Contribution of one term to one document.
    fn term_score(&self, term_freq: usize, doc_length: f64, idf: f64, stats: &CorpusStats) -> f64;

    /// Get the name of this scorer.
    fn name(&self) -> &'static str;
}

/// Okapi BM25 with a non-negative IDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Scorer {
    /// Term frequency saturation.
    k1: f64,
    /// Length normalization strength.
    b: f64,
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Bm25Scorer { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Scorer {
    /// Create a BM25 scorer with k1 = 1.2 and b = 0.75.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a BM25 scorer with custom parameters.
    pub fn with_params(k1: f64, b: f64) -> Self {
        Bm25Scorer { k1, b }
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f64 {
        self.k1
    }

    /// Get the b parameter.
    pub fn b(&self) -> f64 {
        self.b
    }
}

impl Scorer for Bm25Scorer {
    fn idf(&self, doc_freq: usize, stats: &CorpusStats) -> f64 {
        if doc_freq == 0 {
            return 0.0;
        }
        let df = doc_freq as f64;
        // ln((N - df + 0.5) / (df + 0.5) + 1)
        ((stats.doc_count - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn term_score(&self, term_freq: usize, doc_length: f64, idf: f64, stats: &CorpusStats) -> f64 {
        if term_freq == 0 {
            return 0.0;
        }
        let tf = term_freq as f64;
        let norm = if stats.avgdl > 0.0 {
            (1.0 - self.b) + self.b * (doc_length / stats.avgdl)
        } else {
            1.0
        };
        idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }

    fn name(&self) -> &'static str {
        "bm25"
    }
}

/// Log-scaled TF-IDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfIdfScorer {
    epsilon: f64,
}

impl Default for TfIdfScorer {
    fn default() -> Self {
        TfIdfScorer { epsilon: 1e-12 }
    }
}

impl TfIdfScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scorer for TfIdfScorer {
    fn idf(&self, doc_freq: usize, stats: &CorpusStats) -> f64 {
        if doc_freq == 0 {
            return 0.0;
        }
        (stats.doc_count / doc_freq as f64 + self.epsilon).ln()
    }

    fn term_score(&self, term_freq: usize, _doc_length: f64, idf: f64, _stats: &CorpusStats) -> f64 {
        if term_freq == 0 {
            return 0.0;
        }
        (1.0 + (term_freq as f64).ln()) * idf
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}
