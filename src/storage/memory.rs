//! In-memory package storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{QuarryError, Result};
use crate::index::package::IndexPackage;
use crate::storage::codec;
use crate::storage::traits::PackageStorage;

/// Keeps encoded packages in a map keyed by path.
///
/// Packages go through the same codec as [`FileStorage`], so a round trip
/// here exercises exactly what is written to disk.
///
/// [`FileStorage`]: crate::storage::file::FileStorage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    packages: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw bytes at `path`, bypassing the encoder.
    pub fn insert_raw<S: Into<String>>(&self, path: S, bytes: Vec<u8>) {
        self.packages.write().insert(path.into(), bytes);
    }

    /// Number of stored packages.
    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }
}

impl PackageStorage for MemoryStorage {
    fn store(&self, package: &IndexPackage, path: &str) -> Result<()> {
        let bytes = codec::encode(package)?;
        self.packages.write().insert(path.to_string(), bytes);
        Ok(())
    }

    fn retrieve(&self, path: &str) -> Result<IndexPackage> {
        let packages = self.packages.read();
        let bytes = packages
            .get(path)
            .ok_or_else(|| QuarryError::not_found(path))?;
        codec::decode(bytes)
    }

    fn exists(&self, path: &str) -> bool {
        self.packages.read().contains_key(path)
    }

    fn remove(&self, path: &str) -> Result<()> {
        self.packages.write().remove(path);
        Ok(())
    }

    fn storage_type(&self) -> &'static str {
        "memory"
    }
}
