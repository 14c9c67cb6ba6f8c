//! Relevance ranking of candidate documents.
//!
//! Candidates are scored with a [`Scorer`] over the unigram statistics of
//! the index and sorted by descending score, then ascending document ID.
//! Every candidate is returned, including those matching no query term.

pub mod scorer;

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

pub use self::scorer::{Bm25Scorer, CorpusStats, Scorer, TfIdfScorer};

use crate::error::Result;
use crate::index::key::TermKey;
use crate::index::package::{DocId, IndexReader};
use crate::storage::IndexStore;

/// Scoring function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMethod {
    #[default]
    Bm25,
    TfIdf,
}

impl RankingMethod {
    /// Parse a method name. `tfidf` selects TF-IDF; `bm25`, `default` and
    /// any unrecognized name select BM25.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => RankingMethod::TfIdf,
            "bm25" | "default" => RankingMethod::Bm25,
            other => {
                debug!("unknown ranking method {other:?}, using bm25");
                RankingMethod::Bm25
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMethod::Bm25 => "bm25",
            RankingMethod::TfIdf => "tfidf",
        }
    }

    /// The default scorer for this method.
    pub fn scorer(&self) -> Box<dyn Scorer> {
        match self {
            RankingMethod::Bm25 => Box::new(Bm25Scorer::new()),
            RankingMethod::TfIdf => Box::new(TfIdfScorer::new()),
        }
    }
}

impl FromStr for RankingMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(RankingMethod::parse(s))
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores and orders candidate documents.
#[derive(Debug)]
pub struct Ranker {
    scorer: Box<dyn Scorer>,
}

impl Default for Ranker {
    fn default() -> Self {
        Ranker::new(RankingMethod::default())
    }
}

impl Ranker {
    pub fn new(method: RankingMethod) -> Self {
        Ranker {
            scorer: method.scorer(),
        }
    }

    /// Rank with a custom scorer, e.g. BM25 with tuned parameters.
    pub fn with_scorer(scorer: Box<dyn Scorer>) -> Self {
        Ranker { scorer }
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Score every candidate and return IDs with aligned scores, best first.
    ///
    /// Repeated query terms contribute once per occurrence.
    pub fn rank<S: AsRef<str>>(
        &self,
        query_terms: &[S],
        candidates: &[DocId],
        reader: &dyn IndexReader,
    ) -> (Vec<DocId>, Vec<f64>) {
        let metadata = reader.metadata();
        let stats = CorpusStats::from_metadata(metadata);

        let weighted: Vec<(TermKey, f64)> = query_terms
            .iter()
            .map(|term| TermKey::term(term.as_ref()))
            .filter_map(|key| {
                let doc_freq = reader.doc_frequency(&key);
                (doc_freq > 0).then(|| {
                    let idf = self.scorer.idf(doc_freq, &stats);
                    (key, idf)
                })
            })
            .collect();

        let mut scored: Vec<(DocId, f64)> = candidates
            .iter()
            .map(|&doc_id| {
                let doc_length = metadata.doc_length(doc_id).unwrap_or(0).max(1) as f64;
                let score = weighted
                    .iter()
                    .map(|(key, idf)| {
                        let term_freq = reader.term_frequency(key, doc_id);
                        self.scorer.term_score(term_freq, doc_length, *idf, &stats)
                    })
                    .sum();
                (doc_id, score)
            })
            .collect();

        scored.sort_by(compare_scored);

        debug!(
            "ranked {} candidates with {} ({} of {} query terms indexed)",
            scored.len(),
            self.scorer.name(),
            weighted.len(),
            query_terms.len()
        );

        scored.into_iter().unzip()
    }
}

/// Rank `candidates` against the package at `path`.
///
/// Fails only when the package cannot be loaded.
pub fn rank_documents<S: AsRef<str>>(
    query_terms: &[S],
    candidates: &[DocId],
    store: &IndexStore,
    path: &str,
    method: RankingMethod,
) -> Result<(Vec<DocId>, Vec<f64>)> {
    let package = store.load_or_get_cached(path)?;
    Ok(Ranker::new(method).rank(query_terms, candidates, package.as_ref()))
}

/// Order two scored entries: descending score, then ascending ID.
pub fn compare_scored(a: &(DocId, f64), b: &(DocId, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
