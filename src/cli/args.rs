//! Command line argument parsing for the Quarry CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::ranking::RankingMethod;

/// Default package location for one-shot runs.
pub const DEFAULT_INDEX_PATH: &str = "cache/unified_package.qrpk";

/// Quarry - boolean, wildcard, proximity and natural-language search
#[derive(Parser, Debug, Clone)]
#[command(name = "quarry")]
#[command(about = "Build a unified n-gram index and run ranked queries against it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QuarryArgs {
    /// Verbosity level (repeat for more: -v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Ranking method: default, bm25 or tfidf (unknown names use bm25)
    #[arg(long, env = "QUARRY_METHOD", default_value = "bm25", global = true)]
    pub method: String,

    /// Maximum number of documents per query (0 for no limit)
    #[arg(long, env = "QUARRY_LIMIT", default_value_t = 10, global = true)]
    pub limit: usize,

    /// Omit scores from the run output
    #[arg(long, global = true)]
    pub no_scores: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QuarryArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose + 1
        }
    }

    /// Search settings derived from the global flags.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            result_limit: (self.limit > 0).then_some(self.limit),
            method: RankingMethod::parse(&self.method),
            include_scores: !self.no_scores,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index package from a JSONL document file
    Index(IndexArgs),

    /// Run a JSON query file against an index package
    Search(SearchArgs),

    /// Index documents, then search them
    Run(RunArgs),

    /// Print the detected type of a query
    Classify(ClassifyArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// JSONL file with one {"id", "tokens" | "text"} object per line
    #[arg(value_name = "DOCUMENTS_JSONL")]
    pub documents: PathBuf,

    /// Where to write the index package
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Index package to search
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// JSON array of {"qid", "query"} objects
    #[arg(value_name = "QUERIES_JSON")]
    pub queries: PathBuf,

    /// Where to write the ranked results
    #[arg(value_name = "RUN_OUTPUT_JSON")]
    pub output: PathBuf,
}

/// Arguments for a one-shot index and search
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// JSON array of {"qid", "query"} objects
    #[arg(value_name = "QUERIES_JSON")]
    pub queries: PathBuf,

    /// JSONL file with one {"id", "tokens" | "text"} object per line
    #[arg(value_name = "DOCUMENTS_JSONL")]
    pub documents: PathBuf,

    /// Where to write the ranked results
    #[arg(value_name = "RUN_OUTPUT_JSON")]
    pub output: PathBuf,

    /// Where to write the intermediate index package
    #[arg(long, default_value = DEFAULT_INDEX_PATH)]
    pub index_path: PathBuf,
}

/// Arguments for query classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Settings applied to every query of a search run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Maximum documents kept per query; `None` keeps all.
    pub result_limit: Option<usize>,

    /// Scoring function.
    pub method: RankingMethod,

    /// Whether scores are written alongside document IDs.
    pub include_scores: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            result_limit: Some(10),
            method: RankingMethod::Bm25,
            include_scores: true,
        }
    }
}
