//! # Quarry
//!
//! A small textual search engine core.
//!
//! ## Features
//!
//! - One-pass index building: 1-3 token n-gram postings, character n-grams
//!   for wildcard expansion and positions for proximity search
//! - Checksummed binary index packages with a path-keyed cache
//! - Boolean (`AND`/`OR`/`NOT`, parentheses, quoted phrases), wildcard
//!   (`clim*`), proximity (`a NEAR/3 b`) and natural-language queries
//! - BM25 and TF-IDF ranking
//!
//! ## Example
//!
//! ```
//! use quarry::index::IndexBuilder;
//! use quarry::query::QueryProcessor;
//! use quarry::ranking::{Ranker, RankingMethod};
//!
//! let docs = vec![vec!["climate", "change"], vec!["climate", "policy"]];
//! let package = IndexBuilder::build(&docs, Some(&[10, 20])).unwrap();
//!
//! let outcome = QueryProcessor::new(&package).process("climate AND NOT policy").unwrap();
//! let candidates: Vec<u64> = outcome.candidates.into_iter().collect();
//! assert_eq!(candidates, vec![10]);
//!
//! let (ids, _scores) = Ranker::new(RankingMethod::Bm25).rank(&["climate"], &[20, 10], &package);
//! assert_eq!(ids, vec![10, 20]);
//! ```

pub mod analysis;
pub mod cli;
pub mod error;
pub mod index;
pub mod query;
pub mod ranking;
pub mod storage;

pub mod prelude {
    pub use crate::error::{MalformedReason, QuarryError, Result};
    pub use crate::index::{DocId, IndexBuilder, IndexPackage, IndexReader, Position, TermKey};
    pub use crate::query::{QueryOutcome, QueryProcessor, QueryType};
    pub use crate::ranking::{Ranker, RankingMethod};
    pub use crate::storage::IndexStore;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
