//! Index construction and in-memory lookup structures.

pub mod builder;
pub mod key;
pub mod package;

pub use self::builder::IndexBuilder;
pub use self::key::TermKey;
pub use self::package::{DocId, IndexMetadata, IndexPackage, IndexReader, Position};
