//! Path-keyed package cache with lookup helpers.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::error::{QuarryError, Result};
use crate::index::builder::IndexBuilder;
use crate::index::key::TermKey;
use crate::index::package::{DocId, IndexPackage, IndexReader, Position};
use crate::storage::file::FileStorage;
use crate::storage::memory::MemoryStorage;
use crate::storage::traits::PackageStorage;

/// Loads packages through a [`PackageStorage`] and memoizes them per path.
///
/// The cache is owned by the caller and is never invalidated on its own.
/// Writing a new package to a cached path does not change what this store
/// returns until the entry is removed with [`IndexStore::evict`],
/// [`IndexStore::reload`] or [`IndexStore::clear`].
///
/// Cached packages are immutable and shared as `Arc`s, so any number of
/// threads may read them without further locking. Two threads racing to load
/// the same uncached path may both decode it; the first insert wins.
#[derive(Debug)]
pub struct IndexStore {
    storage: Arc<dyn PackageStorage>,
    cache: RwLock<HashMap<String, Arc<IndexPackage>>>,
}

impl IndexStore {
    /// Create a store over the given storage backend.
    pub fn new(storage: Arc<dyn PackageStorage>) -> Self {
        IndexStore {
            storage,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A store over the file system with default configuration.
    pub fn file() -> Self {
        Self::new(Arc::new(FileStorage::default()))
    }

    /// A store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Get the storage backend.
    pub fn storage(&self) -> &Arc<dyn PackageStorage> {
        &self.storage
    }

    /// Return the cached package for `path`, loading it on first use.
    pub fn load_or_get_cached(&self, path: &str) -> Result<Arc<IndexPackage>> {
        if let Some(package) = self.cache.read().get(path) {
            return Ok(Arc::clone(package));
        }

        if !self.storage.exists(path) {
            return Err(QuarryError::not_found(path));
        }
        let package = Arc::new(self.storage.retrieve(path)?);
        info!(
            "loaded index package {path} ({} documents, {} keys)",
            package.metadata.resolved_doc_count(),
            package.key_count()
        );

        let mut cache = self.cache.write();
        Ok(Arc::clone(
            cache.entry(path.to_string()).or_insert(package),
        ))
    }

    /// Persist a package. The cache is left untouched.
    pub fn save(&self, package: &IndexPackage, path: &str) -> Result<()> {
        self.storage.store(package, path)
    }

    /// Build a package, persist it at `path` and drop any stale cache entry.
    pub fn build_and_store<D, S>(
        &self,
        tokenized_docs: &[D],
        doc_ids: Option<&[DocId]>,
        path: &str,
    ) -> Result<Arc<IndexPackage>>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let package = IndexBuilder::build(tokenized_docs, doc_ids)?;
        self.save(&package, path)?;
        self.evict(path);
        Ok(Arc::new(package))
    }

    /// Drop the cache entry for `path`. Returns whether one existed.
    pub fn evict(&self, path: &str) -> bool {
        let evicted = self.cache.write().remove(path).is_some();
        if evicted {
            debug!("evicted cached package {path}");
        }
        evicted
    }

    /// Discard any cached copy and load `path` again.
    pub fn reload(&self, path: &str) -> Result<Arc<IndexPackage>> {
        self.evict(path);
        self.load_or_get_cached(path)
    }

    /// Drop every cache entry.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Whether `path` is currently cached.
    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.read().contains_key(path)
    }

    /// Ascending document IDs for `key`; empty if the key is not indexed.
    pub fn posting_list(&self, key: &TermKey, path: &str) -> Result<Vec<DocId>> {
        Ok(self.load_or_get_cached(path)?.posting_list(key).to_vec())
    }

    /// Ascending terms containing the character n-gram; empty on a miss.
    pub fn wildcard_matches(&self, gram: &str, path: &str) -> Result<Vec<String>> {
        Ok(self.load_or_get_cached(path)?.wildcard_matches(gram).to_vec())
    }

    /// Ascending positions of `key` in `doc_id`; empty on a miss.
    pub fn term_positions(
        &self,
        key: &TermKey,
        doc_id: DocId,
        path: &str,
    ) -> Result<Vec<Position>> {
        Ok(self
            .load_or_get_cached(path)?
            .term_positions(key, doc_id)
            .to_vec())
    }
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::file()
    }
}
