//! Integration tests for package persistence and the index store cache.

use std::fs;
use std::sync::Arc;

use quarry::error::{QuarryError, Result};
use quarry::index::{IndexBuilder, IndexReader};
use quarry::storage::{FileStorage, IndexStore, PackageStorage, StorageConfig};
use tempfile::TempDir;

fn package_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().to_string()
}

#[test]
fn test_file_round_trip_preserves_everything() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = package_path(&temp_dir, "index.qrpk");
    let storage = FileStorage::new(StorageConfig {
        buffer_size: 4096,
        sync_writes: true,
    });

    let package = IndexBuilder::build(
        &[vec!["alpha", "beta", "gamma"], vec!["beta", "beta"]],
        Some(&[u64::MAX, 7]),
    )?;
    storage.store(&package, &path)?;

    let loaded = storage.retrieve(&path)?;
    assert_eq!(loaded, package);
    assert_eq!(loaded.posting_list(&"beta".into()), &[7, u64::MAX]);
    assert_eq!(loaded.term_positions(&"beta".into(), 7), &[0, 1]);
    assert_eq!(loaded.metadata().doc_length(u64::MAX), Some(3));
    Ok(())
}

#[test]
fn test_store_reports_missing_and_corrupt_packages() {
    let temp_dir = TempDir::new().unwrap();
    let store = IndexStore::file();

    let missing = package_path(&temp_dir, "missing.qrpk");
    assert!(matches!(
        store.load_or_get_cached(&missing),
        Err(QuarryError::NotFound(_))
    ));

    let corrupt = package_path(&temp_dir, "corrupt.qrpk");
    fs::write(&corrupt, b"QRPK but not really a package").unwrap();
    assert!(matches!(
        store.load_or_get_cached(&corrupt),
        Err(QuarryError::Corrupt(_))
    ));
    assert!(!store.is_cached(&corrupt));
}

#[test]
fn test_flipped_payload_byte_fails_checksum() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = package_path(&temp_dir, "index.qrpk");
    let store = IndexStore::file();
    store.build_and_store(&[vec!["x", "y"]], None, &path)?;

    let mut bytes = fs::read(&path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes)?;

    assert!(matches!(
        IndexStore::file().load_or_get_cached(&path),
        Err(QuarryError::Corrupt(_))
    ));
    Ok(())
}

#[test]
fn test_rebuild_replaces_cached_package() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = package_path(&temp_dir, "index.qrpk");
    let store = IndexStore::file();

    store.build_and_store(&[vec!["first"]], None, &path)?;
    assert_eq!(store.posting_list(&"first".into(), &path)?, vec![0]);
    assert!(store.is_cached(&path));

    store.build_and_store(&[vec!["second"]], Some(&[5]), &path)?;
    assert!(!store.is_cached(&path));
    assert!(store.posting_list(&"first".into(), &path)?.is_empty());
    assert_eq!(store.posting_list(&"second".into(), &path)?, vec![5]);
    Ok(())
}

#[test]
fn test_parallel_loads_share_one_package() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = package_path(&temp_dir, "index.qrpk");
    let store = Arc::new(IndexStore::file());
    store.build_and_store(&[vec!["a", "b"], vec!["b", "c"]], Some(&[1, 2]), &path)?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let path = path.clone();
            std::thread::spawn(move || store.load_or_get_cached(&path).unwrap())
        })
        .collect();
    let packages: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let cached = store.load_or_get_cached(&path)?;
    assert!(packages.iter().all(|p| p.posting_list(&"b".into()) == [1, 2]));
    assert_eq!(cached.wildcard_matches("$b"), &["b"]);
    Ok(())
}
