//! File-based package storage.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{QuarryError, Result};
use crate::index::package::IndexPackage;
use crate::storage::codec;
use crate::storage::traits::{PackageStorage, StorageConfig};

/// Stores each package as a single file at its path.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a concurrent reader never observes a half-written package.
#[derive(Debug, Default)]
pub struct FileStorage {
    /// Storage configuration.
    config: StorageConfig,
}

impl FileStorage {
    /// Create a new file storage.
    pub fn new(config: StorageConfig) -> Self {
        FileStorage { config }
    }

    /// Get the storage configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl PackageStorage for FileStorage {
    fn store(&self, package: &IndexPackage, path: &str) -> Result<()> {
        let target = Path::new(path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                QuarryError::storage(format!("Failed to create directory: {e}"))
            })?;
        }

        let bytes = codec::encode(package)?;
        let temp = Self::temp_path(target);
        {
            let file = File::create(&temp)?;
            let mut writer = BufWriter::with_capacity(self.config.buffer_size, file);
            writer.write_all(&bytes)?;
            writer.flush()?;
            if self.config.sync_writes {
                writer
                    .get_ref()
                    .sync_all()
                    .map_err(|e| QuarryError::storage(format!("Failed to sync: {e}")))?;
            }
        }

        fs::rename(&temp, target)
            .map_err(|e| QuarryError::storage(format!("Failed to rename package file: {e}")))?;

        info!("stored index package at {path} ({} bytes)", bytes.len());
        Ok(())
    }

    fn retrieve(&self, path: &str) -> Result<IndexPackage> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                QuarryError::not_found(path)
            } else {
                QuarryError::Io(e)
            }
        })?;

        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        debug!("read {} bytes from {path}", bytes.len());

        codec::decode(&bytes)
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn remove(&self, path: &str) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(QuarryError::storage(format!("Failed to delete file: {e}"))),
        }
    }

    fn storage_type(&self) -> &'static str {
        "file"
    }
}
