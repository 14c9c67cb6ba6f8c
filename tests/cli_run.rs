//! Integration tests for the CLI commands.

use std::fs;
use std::path::Path;

use clap::Parser;
use quarry::cli::{QuarryArgs, QueryId, RunEntry, execute_command};
use quarry::error::Result;
use tempfile::TempDir;

const DOCUMENTS: &str = r#"{"id": 10, "tokens": ["climate", "change", "effects"]}
{"id": 20, "tokens": ["machine", "learning", "algorithms"]}
{"id": 30, "text": "Climate science, research."}
{"id": 40, "tokens": ["renewable", "energy", "transition"]}
this line is not json
{"id": 10, "tokens": ["duplicate"]}
"#;

const QUERIES: &str = r#"[
  {"qid": "q1", "query": "climate AND NOT science"},
  {"qid": "q2", "query": "clim*"},
  {"qid": "q3", "query": "\"machine learning\" NEAR/2 algorithms"},
  {"qid": "q4", "query": "renewable energy"},
  {"qid": "q5", "query": "climate XOR energy"},
  {"qid": 6, "query": "climate OR science OR energy"}
]"#;

fn run(args: &[&str]) -> Result<()> {
    let mut argv = vec!["quarry", "-q"];
    argv.extend_from_slice(args);
    execute_command(QuarryArgs::parse_from(argv))
}

fn read_run(path: &Path) -> Vec<RunEntry> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn qid(s: &str) -> QueryId {
    QueryId::Text(s.to_string())
}

#[test]
fn test_run_indexes_and_searches() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let documents = temp_dir.path().join("documents.jsonl");
    let queries = temp_dir.path().join("queries.json");
    let output = temp_dir.path().join("out/run.json");
    let index = temp_dir.path().join("cache/unified_package.qrpk");
    fs::write(&documents, DOCUMENTS)?;
    fs::write(&queries, QUERIES)?;

    run(&[
        "--limit",
        "2",
        "run",
        queries.to_str().unwrap(),
        documents.to_str().unwrap(),
        output.to_str().unwrap(),
        "--index-path",
        index.to_str().unwrap(),
    ])?;
    assert!(index.is_file());

    let entries = read_run(&output);
    assert_eq!(entries.len(), 6);

    assert_eq!(entries[0].qid, qid("q1"));
    assert_eq!(entries[0].doc_ids, vec![10]);
    assert_eq!(entries[1].doc_ids, vec![10, 30]);
    assert_eq!(entries[2].doc_ids, vec![20]);
    assert_eq!(entries[3].doc_ids, vec![40]);

    // Malformed queries produce empty results without stopping the run.
    assert_eq!(entries[4].qid, qid("q5"));
    assert!(entries[4].doc_ids.is_empty());

    assert_eq!(entries[5].qid, QueryId::Number(6));
    assert_eq!(entries[5].doc_ids.len(), 2);
    assert_eq!(entries[5].doc_ids[0], 30);

    for entry in &entries {
        let scores = entry.scores.as_ref().expect("scores requested");
        assert_eq!(scores.len(), entry.doc_ids.len());
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
    Ok(())
}

#[test]
fn test_index_then_search_without_scores() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let documents = temp_dir.path().join("documents.jsonl");
    let queries = temp_dir.path().join("queries.json");
    let output = temp_dir.path().join("run.json");
    let index = temp_dir.path().join("index.qrpk");
    fs::write(&documents, DOCUMENTS)?;
    fs::write(&queries, QUERIES)?;

    run(&["index", documents.to_str().unwrap(), index.to_str().unwrap()])?;
    run(&[
        "--method",
        "tfidf",
        "--no-scores",
        "search",
        index.to_str().unwrap(),
        queries.to_str().unwrap(),
        output.to_str().unwrap(),
    ])?;

    let entries = read_run(&output);
    assert!(entries.iter().all(|e| e.scores.is_none()));
    assert_eq!(entries[5].doc_ids, vec![30, 40, 10]);
    Ok(())
}

#[test]
fn test_search_missing_index_fails() {
    let temp_dir = TempDir::new().unwrap();
    let queries = temp_dir.path().join("queries.json");
    fs::write(&queries, QUERIES).unwrap();

    let result = run(&[
        "search",
        temp_dir.path().join("absent.qrpk").to_str().unwrap(),
        queries.to_str().unwrap(),
        temp_dir.path().join("run.json").to_str().unwrap(),
    ]);
    assert!(result.is_err());
}
