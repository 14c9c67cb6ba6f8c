//! Command implementations for the Quarry CLI.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{QuarryError, Result};
use crate::index::package::{DocId, IndexReader};
use crate::query::{QueryProcessor, classify};
use crate::ranking::Ranker;
use crate::storage::IndexStore;

/// Execute a CLI command.
pub fn execute_command(args: QuarryArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => index_documents(index_args, &args),
        Command::Search(search_args) => search_index(search_args, &args),
        Command::Run(run_args) => run_pipeline(run_args, &args),
        Command::Classify(classify_args) => classify_query(classify_args, &args),
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| QuarryError::invalid_argument(format!("Non UTF-8 path: {}", path.display())))
}

/// Build and store an index package.
fn index_documents(args: &IndexArgs, cli_args: &QuarryArgs) -> Result<()> {
    let store = IndexStore::file();
    build_index(&store, &args.documents, &args.index_path, cli_args)
}

fn build_index(
    store: &IndexStore,
    documents: &Path,
    index_path: &Path,
    cli_args: &QuarryArgs,
) -> Result<()> {
    let start_time = Instant::now();
    let analyzer = StandardAnalyzer::new();
    let batch = read_documents_file(documents, &analyzer)?;
    if batch.skipped > 0 {
        warn!("{} document lines skipped", batch.skipped);
    }

    let path = path_str(index_path)?;
    let package = store.build_and_store(&batch.tokens, Some(&batch.ids), path)?;

    output_result(
        "Index built successfully",
        &IndexSummary {
            path: path.to_string(),
            documents: batch.ids.len(),
            skipped_lines: batch.skipped,
            keys: package.key_count(),
            char_grams: package.gram_count(),
            avgdl: package.metadata.resolved_avgdl(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Run a query file against a stored package.
fn search_index(args: &SearchArgs, cli_args: &QuarryArgs) -> Result<()> {
    let store = IndexStore::file();
    search_with_store(&store, &args.index_path, &args.queries, &args.output, cli_args)
}

fn search_with_store(
    store: &IndexStore,
    index_path: &Path,
    queries: &Path,
    output: &Path,
    cli_args: &QuarryArgs,
) -> Result<()> {
    let start_time = Instant::now();
    let config = cli_args.search_config();
    let package = store.load_or_get_cached(path_str(index_path)?)?;
    let queries = read_queries_file(queries)?;

    let analyzer = StandardAnalyzer::new();
    let (entries, failed) = search_queries(package.as_ref(), &analyzer, &queries, &config);
    write_run_file(output, &entries)?;

    output_result(
        "Search completed",
        &SearchSummary {
            output: output.display().to_string(),
            queries: entries.len(),
            failed_queries: failed,
            method: config.method.to_string(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Index then search in one invocation.
fn run_pipeline(args: &RunArgs, cli_args: &QuarryArgs) -> Result<()> {
    let store = IndexStore::file();
    build_index(&store, &args.documents, &args.index_path, cli_args)?;
    search_with_store(&store, &args.index_path, &args.queries, &args.output, cli_args)
}

/// Print the detected query type, or why the query was rejected.
fn classify_query(args: &ClassifyArgs, _cli_args: &QuarryArgs) -> Result<()> {
    match classify(&args.query) {
        Ok(query_type) => println!("{query_type}"),
        Err(QuarryError::MalformedQuery(reason)) => println!("malformed: {reason}"),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Answer every query in parallel. Malformed queries produce empty entries
/// and are counted in the second return value.
pub fn search_queries(
    reader: &dyn IndexReader,
    analyzer: &dyn Analyzer,
    queries: &[QueryRecord],
    config: &SearchConfig,
) -> (Vec<RunEntry>, usize) {
    let ranker = Ranker::new(config.method);

    let results: Vec<(RunEntry, bool)> = queries
        .par_iter()
        .map(|record| match answer_query(reader, analyzer, &ranker, record, config) {
            Ok(entry) => (entry, true),
            Err(e) => {
                warn!("query {} ({:?}) failed: {e}", record.qid, record.query);
                let entry = RunEntry {
                    qid: record.qid.clone(),
                    doc_ids: Vec::new(),
                    scores: config.include_scores.then(Vec::new),
                };
                (entry, false)
            }
        })
        .collect();

    let failed = results.iter().filter(|(_, ok)| !ok).count();
    info!("answered {} queries, {failed} failed", results.len());
    (results.into_iter().map(|(entry, _)| entry).collect(), failed)
}

/// Process, rank, deduplicate and cap one query.
pub fn answer_query(
    reader: &dyn IndexReader,
    analyzer: &dyn Analyzer,
    ranker: &Ranker,
    record: &QueryRecord,
    config: &SearchConfig,
) -> Result<RunEntry> {
    let outcome = QueryProcessor::new(reader)
        .with_analyzer(analyzer)
        .process(&record.query)?;

    let candidates: Vec<DocId> = outcome.candidates.iter().copied().collect();
    let (ranked, scores) = ranker.rank(&outcome.ranking_terms, &candidates, reader);

    let limit = config.result_limit.unwrap_or(usize::MAX);
    let mut seen = HashSet::new();
    let (doc_ids, scores): (Vec<DocId>, Vec<f64>) = ranked
        .into_iter()
        .zip(scores)
        .filter(|(doc_id, _)| seen.insert(*doc_id))
        .take(limit)
        .unzip();

    Ok(RunEntry {
        qid: record.qid.clone(),
        doc_ids,
        scores: config.include_scores.then_some(scores),
    })
}
