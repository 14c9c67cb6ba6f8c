//! End-to-end tests: build, persist, load, query and rank.

use std::collections::BTreeSet;

use quarry::error::{MalformedReason, QuarryError, Result};
use quarry::index::{DocId, IndexBuilder, IndexPackage, IndexReader, TermKey};
use quarry::query::{
    BooleanEvaluator, ProximityEvaluator, QueryProcessor, QueryType, WildcardEvaluator,
    process_query,
};
use quarry::ranking::{Ranker, RankingMethod, rank_documents};
use quarry::storage::IndexStore;
use tempfile::TempDir;

fn ids(set: BTreeSet<DocId>) -> Vec<DocId> {
    set.into_iter().collect()
}

fn ngram_corpus() -> IndexPackage {
    IndexBuilder::build(
        &[
            vec!["climate", "change", "is", "real"],
            vec!["machine", "learning", "climate", "models"],
            vec!["deep", "learning", "for", "climate", "change"],
        ],
        Some(&[10, 20, 30]),
    )
    .unwrap()
}

fn boolean_corpus() -> IndexPackage {
    IndexBuilder::build(
        &[
            vec!["climate", "change", "effects"],
            vec!["machine", "learning", "algorithms"],
            vec!["climate", "science", "research"],
            vec!["renewable", "energy", "transition"],
        ],
        Some(&[10, 20, 30, 40]),
    )
    .unwrap()
}

#[test]
fn test_unigram_and_bigram_postings() {
    let package = ngram_corpus();
    assert_eq!(package.posting_list(&"climate".into()), &[10, 20, 30]);
    assert_eq!(package.posting_list(&["climate", "change"].into()), &[10, 30]);
    assert_eq!(
        package.posting_list(&["deep", "learning", "for"].into()),
        &[30]
    );
}

#[test]
fn test_wildcard_lists() {
    let package = ngram_corpus();
    assert_eq!(package.wildcard_matches("$cl"), &["climate"]);

    let package =
        IndexBuilder::build(&[vec!["update", "climate"], vec!["create"]], None).unwrap();
    assert_eq!(
        package.wildcard_matches("te$"),
        &["climate", "create", "update"]
    );
}

#[test]
fn test_boolean_examples() -> Result<()> {
    let package = boolean_corpus();
    let evaluator = BooleanEvaluator::new(&package);
    assert_eq!(ids(evaluator.evaluate("climate AND NOT science")?), vec![10]);
    assert_eq!(
        ids(evaluator.evaluate("( climate AND change ) OR science")?),
        vec![10, 30]
    );
    Ok(())
}

#[test]
fn test_proximity_examples() -> Result<()> {
    let package = boolean_corpus();
    let evaluator = ProximityEvaluator::new(&package);
    assert_eq!(
        ids(evaluator.evaluate("\"machine learning\" NEAR/2 algorithms")?),
        vec![20]
    );
    // Overlapping spans are at distance zero.
    assert_eq!(
        ids(evaluator.evaluate("change NEAR/0 \"climate change\"")?),
        vec![10]
    );
    Ok(())
}

#[test]
fn test_out_of_vocabulary_lookups_are_empty() -> Result<()> {
    let package = boolean_corpus();
    assert!(package.posting_list(&TermKey::term("glacier")).is_empty());
    assert!(package.wildcard_matches("zz$").is_empty());
    assert!(package.term_positions(&"climate".into(), 20).is_empty());
    assert!(WildcardEvaluator::new(&package).evaluate("glac*").is_empty());
    assert!(
        ProximityEvaluator::new(&package)
            .evaluate("glacier NEAR/3 ice")?
            .is_empty()
    );
    Ok(())
}

#[test]
fn test_build_order_does_not_matter() {
    let forward = IndexBuilder::build(
        &[vec!["b", "a", "c"], vec!["a", "b"], vec!["c", "a"]],
        Some(&[3, 1, 2]),
    )
    .unwrap();
    let shuffled = IndexBuilder::build(
        &[vec!["c", "a"], vec!["b", "a", "c"], vec!["a", "b"]],
        Some(&[2, 3, 1]),
    )
    .unwrap();

    assert_eq!(forward, shuffled);
    for term in ["a", "b", "c"] {
        let key = TermKey::term(term);
        assert!(forward.posting_list(&key).windows(2).all(|w| w[0] < w[1]));
    }
    assert_eq!(forward.term_positions(&"a".into(), 3), &[1]);
}

#[test]
fn test_rank_is_a_permutation() {
    let package = boolean_corpus();
    let candidates = vec![40, 10, 30, 20];

    for method in ["default", "bm25", "tfidf", "nonsense"] {
        let ranker = Ranker::new(RankingMethod::parse(method));

        let (ranked, scores) = ranker.rank(&["climate", "science"], &candidates, &package);
        let mut sorted = ranked.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![10, 20, 30, 40], "{method}");
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{method}");
        assert_eq!(ranked[0], 30, "{method}");

        let (ranked, scores) = ranker.rank::<&str>(&[], &candidates, &package);
        assert_eq!(ranked, vec![10, 20, 30, 40]);
        assert!(scores.iter().all(|&s| s == 0.0));
    }
}

#[test]
fn test_persisted_pipeline() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir
        .path()
        .join("cache/unified_package.qrpk")
        .to_string_lossy()
        .to_string();

    let store = IndexStore::file();
    store.build_and_store(
        &[
            vec!["climate", "change", "effects"],
            vec!["machine", "learning", "algorithms"],
            vec!["climate", "science", "research"],
        ],
        Some(&[10, 20, 30]),
        &path,
    )?;

    // A fresh store reads the package back from disk.
    let store = IndexStore::file();
    let outcome = process_query(&store, "climat*", &path)?;
    assert_eq!(outcome.query_type, QueryType::Wildcard);
    assert_eq!(ids(outcome.candidates.clone()), vec![10, 30]);

    let candidates: Vec<DocId> = outcome.candidates.into_iter().collect();
    let (ranked, scores) = rank_documents(
        &outcome.ranking_terms,
        &candidates,
        &store,
        &path,
        RankingMethod::Bm25,
    )?;
    assert_eq!(ranked, vec![10, 30]);
    assert_eq!(scores[0], scores[1]);
    Ok(())
}

#[test]
fn test_malformed_queries_are_reported() {
    let package = boolean_corpus();
    let processor = QueryProcessor::new(&package);

    let cases = [
        ("\"climate change", MalformedReason::UnmatchedQuotes),
        ("(climate AND change", MalformedReason::UnbalancedParentheses),
        ("climate XOR change", MalformedReason::UnknownOperator),
        ("clim* AND change", MalformedReason::MixedTypes),
        ("climate NEAR/2", MalformedReason::MalformedNear),
        ("clim* chan*", MalformedReason::MalformedWildcard),
        ("climate AND", MalformedReason::MalformedBoolean),
    ];
    for (query, reason) in cases {
        match processor.process(query) {
            Err(QuarryError::MalformedQuery(actual)) => assert_eq!(actual, reason, "{query}"),
            other => panic!("{query}: expected {reason:?}, got {other:?}"),
        }
    }
}
