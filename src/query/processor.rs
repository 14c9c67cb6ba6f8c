//! Classify a query, dispatch it to its evaluator and collect ranking terms.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::analysis::Analyzer;
use crate::error::Result;
use crate::index::package::{DocId, IndexReader};
use crate::query::boolean::BooleanEvaluator;
use crate::query::detector::{self, QueryType};
use crate::query::lexer::{self, Token};
use crate::query::natural;
use crate::query::proximity::{ProximityEvaluator, ProximityQuery};
use crate::query::wildcard::WildcardEvaluator;
use crate::storage::IndexStore;

/// The result of processing one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// Detected syntax.
    pub query_type: QueryType,
    /// Unranked matching documents.
    pub candidates: BTreeSet<DocId>,
    /// Unigrams to score candidates with.
    pub ranking_terms: Vec<String>,
}

/// Runs queries of any supported type against one index.
#[derive(Debug, Clone, Copy)]
pub struct QueryProcessor<'a> {
    reader: &'a dyn IndexReader,
    analyzer: Option<&'a dyn Analyzer>,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(reader: &'a dyn IndexReader) -> Self {
        QueryProcessor {
            reader,
            analyzer: None,
        }
    }

    /// Normalize natural-language queries with `analyzer` before lookup.
    pub fn with_analyzer(mut self, analyzer: &'a dyn Analyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Classify and evaluate `query`.
    pub fn process(&self, query: &str) -> Result<QueryOutcome> {
        let query_type = detector::classify(query)?;

        let (candidates, ranking_terms) = match query_type {
            QueryType::Boolean => {
                let candidates = BooleanEvaluator::new(self.reader).evaluate(query)?;
                (candidates, boolean_terms(query)?)
            }
            QueryType::Wildcard => {
                let evaluator = WildcardEvaluator::new(self.reader);
                let terms = evaluator.expand(query);
                (evaluator.union_postings(&terms), terms)
            }
            QueryType::Proximity => {
                let parsed = ProximityQuery::parse(query)?;
                let candidates = ProximityEvaluator::new(self.reader).evaluate_query(&parsed);
                let terms = distinct(
                    parsed
                        .left
                        .tokens()
                        .into_iter()
                        .chain(parsed.right.tokens())
                        .map(str::to_string),
                );
                (candidates, terms)
            }
            QueryType::NaturalLanguage => self.natural_language(query)?,
        };

        debug!(
            "{query_type} query {query:?}: {} candidates, ranking terms {ranking_terms:?}",
            candidates.len()
        );

        Ok(QueryOutcome {
            query_type,
            candidates,
            ranking_terms,
        })
    }

    fn natural_language(&self, query: &str) -> Result<(BTreeSet<DocId>, Vec<String>)> {
        let tokens: Vec<String> = match self.analyzer {
            Some(analyzer) => analyzer.analyze(query),
            None => query.split_whitespace().map(str::to_string).collect(),
        };
        if tokens.is_empty() {
            return Ok((BTreeSet::new(), tokens));
        }

        let rewritten = natural::tokens_to_boolean_or(&tokens);
        let candidates = BooleanEvaluator::new(self.reader).evaluate(&rewritten)?;
        Ok((candidates, tokens))
    }
}

/// Load the package at `path` through `store` and process `query` against it.
pub fn process_query(store: &IndexStore, query: &str, path: &str) -> Result<QueryOutcome> {
    let package = store.load_or_get_cached(path)?;
    QueryProcessor::new(package.as_ref()).process(query)
}

/// Operand words of a boolean query, first occurrence order.
fn boolean_terms(query: &str) -> Result<Vec<String>> {
    let tokens = lexer::tokenize(query)?;
    let words = tokens.into_iter().flat_map(|token| match token {
        Token::Operand(word) => vec![word],
        Token::Phrase(words) => words,
        _ => Vec::new(),
    });
    Ok(distinct(words))
}

fn distinct<I: IntoIterator<Item = String>>(words: I) -> Vec<String> {
    let mut seen = BTreeSet::new();
    words
        .into_iter()
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::error::{MalformedReason, QuarryError};
    use crate::index::{IndexBuilder, IndexPackage};

    fn corpus() -> IndexPackage {
        IndexBuilder::build(
            &[
                vec!["climate", "change", "policy"],
                vec!["climatic", "science"],
                vec!["machine", "learning", "algorithms"],
            ],
            Some(&[1, 2, 3]),
        )
        .unwrap()
    }

    fn ids(outcome: &QueryOutcome) -> Vec<DocId> {
        outcome.candidates.iter().copied().collect()
    }

    #[test]
    fn test_dispatch_by_type() {
        let package = corpus();
        let processor = QueryProcessor::new(&package);

        let outcome = processor.process("climate AND \"change policy\"").unwrap();
        assert_eq!(outcome.query_type, QueryType::Boolean);
        assert_eq!(ids(&outcome), vec![1]);
        assert_eq!(outcome.ranking_terms, vec!["climate", "change", "policy"]);

        let outcome = processor.process("clima*").unwrap();
        assert_eq!(outcome.query_type, QueryType::Wildcard);
        assert_eq!(ids(&outcome), vec![1, 2]);
        assert_eq!(outcome.ranking_terms, vec!["climate", "climatic"]);

        let outcome = processor
            .process("\"machine learning\" NEAR/1 algorithms")
            .unwrap();
        assert_eq!(outcome.query_type, QueryType::Proximity);
        assert_eq!(ids(&outcome), vec![3]);
        assert_eq!(
            outcome.ranking_terms,
            vec!["machine", "learning", "algorithms"]
        );
    }

    #[test]
    fn test_natural_language_fallback() {
        let package = corpus();
        let outcome = QueryProcessor::new(&package)
            .process("science policy unicorn")
            .unwrap();
        assert_eq!(outcome.query_type, QueryType::NaturalLanguage);
        assert_eq!(ids(&outcome), vec![1, 2]);
        assert_eq!(outcome.ranking_terms, vec!["science", "policy", "unicorn"]);

        let outcome = QueryProcessor::new(&package).process("   ").unwrap();
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn test_analyzer_normalizes_natural_language() {
        let package = corpus();
        let analyzer = StandardAnalyzer::new();
        let outcome = QueryProcessor::new(&package)
            .with_analyzer(&analyzer)
            .process("Machine, learning!")
            .unwrap();
        assert_eq!(ids(&outcome), vec![3]);
        assert_eq!(outcome.ranking_terms, vec!["machine", "learning"]);
    }

    #[test]
    fn test_malformed_query_is_rejected() {
        let package = corpus();
        let result = QueryProcessor::new(&package).process("climate XOR change");
        assert!(matches!(
            result,
            Err(QuarryError::MalformedQuery(MalformedReason::UnknownOperator))
        ));
    }

    #[test]
    fn test_process_query_through_store() {
        let store = IndexStore::in_memory();
        store
            .build_and_store(&[vec!["alpha", "beta"], vec!["beta"]], Some(&[7, 8]), "idx")
            .unwrap();
        let outcome = process_query(&store, "alpha OR beta", "idx").unwrap();
        assert_eq!(ids(&outcome), vec![7, 8]);
        assert!(store.is_cached("idx"));
    }
}
