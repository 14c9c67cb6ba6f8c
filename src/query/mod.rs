//! Query detection and evaluation.
//!
//! Every query is first classified by [`detector`], which doubles as the
//! validator: a query that cannot be classified is rejected with
//! [`QuarryError::MalformedQuery`](crate::error::QuarryError::MalformedQuery).
//! Each type then has its own evaluator producing an unranked set of
//! document IDs.

pub mod boolean;
pub mod detector;
pub mod lexer;
pub mod natural;
pub mod postings;
pub mod processor;
pub mod proximity;
pub mod wildcard;

pub use self::boolean::BooleanEvaluator;
pub use self::detector::{QueryDetector, QueryType, classify};
pub use self::natural::to_boolean_or;
pub use self::processor::{QueryOutcome, QueryProcessor, process_query};
pub use self::proximity::{ProximityEvaluator, ProximityQuery, Span};
pub use self::wildcard::{WildcardEvaluator, WildcardPattern};
