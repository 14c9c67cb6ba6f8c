//! Storage abstraction trait and common types.

use crate::error::Result;
use crate::index::package::IndexPackage;

/// A keyed, durable store of whole index packages.
///
/// Implementations replace a package as a unit: a reader either sees the
/// previous package or the new one, never a mix.
pub trait PackageStorage: Send + Sync + std::fmt::Debug {
    /// Persist `package` under `path`, replacing any existing package.
    fn store(&self, package: &IndexPackage, path: &str) -> Result<()>;

    /// Read the package stored under `path`.
    ///
    /// Fails with `NotFound` when nothing is stored there and `Corrupt` when
    /// the stored bytes do not decode.
    fn retrieve(&self, path: &str) -> Result<IndexPackage>;

    /// Check if a package exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Delete the package at `path`. Missing packages are not an error.
    fn remove(&self, path: &str) -> Result<()>;

    /// Get the name of this storage type.
    fn storage_type(&self) -> &'static str;
}

/// Configuration for storage backends.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Buffer size for I/O operations.
    pub buffer_size: usize,

    /// Whether to fsync a package before it is renamed into place.
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            buffer_size: 65536, // 64KB buffer for better I/O performance
            sync_writes: false,
        }
    }
}
