//! Tests for the render cache: writes, TTL sweeping and batches.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use oven_common::{OvenError, SensorKind};
use storage::{sweep_expired, ArtifactFamily, ArtifactName, RackLevel, RenderCache, DEFAULT_TTL};
use test_utils::{temp_test_dir, write_aged_file};

const MINUTE: Duration = Duration::from_secs(60);

fn tracked() -> Vec<String> {
    ArtifactFamily::tracked_suffixes()
}

// ============================================================================
// Sweeping
// ============================================================================

#[test]
fn test_sweep_deletes_only_expired_files() {
    let dir = temp_test_dir();
    let old = write_aged_file(&dir.path().join("1700000000-aaaaaaaa-yz.png"), 11 * MINUTE);
    let fresh = write_aged_file(&dir.path().join("1700000000-bbbbbbbb-yz.png"), 5 * MINUTE);

    let removed = sweep_expired(dir.path(), &tracked(), DEFAULT_TTL).unwrap();

    assert_eq!(removed, 1);
    assert!(!old.exists());
    assert!(fresh.exists());
}

#[test]
fn test_sweep_ignores_untracked_names() {
    let dir = temp_test_dir();
    let other = write_aged_file(&dir.path().join("logo.png"), 60 * MINUTE);
    let notes = write_aged_file(&dir.path().join("1700000000-aaaaaaaa-yz.txt"), 60 * MINUTE);
    let rack = write_aged_file(&dir.path().join("1-aaaaaaaa-middle-aidc.png"), 60 * MINUTE);

    let removed = sweep_expired(dir.path(), &tracked(), DEFAULT_TTL).unwrap();

    assert_eq!(removed, 1);
    assert!(other.exists());
    assert!(notes.exists());
    assert!(!rack.exists());
}

#[test]
fn test_sweep_custom_suffixes_and_ttl() {
    let dir = temp_test_dir();
    let a = write_aged_file(&dir.path().join("a-top.png"), 3 * MINUTE);
    let b = write_aged_file(&dir.path().join("b-top.png"), MINUTE / 2);

    let removed = sweep_expired(dir.path(), &["-top.png"], 2 * MINUTE).unwrap();

    assert_eq!(removed, 1);
    assert!(!a.exists());
    assert!(b.exists());
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_write_creates_directory_and_appends_suffix() {
    let dir = temp_test_dir();
    let images = dir.path().join("web").join("images");
    let cache = RenderCache::new(&images, "/images/", DEFAULT_TTL);

    let stored = cache.write_image("1700000000-abcdefgh-xz", b"png").unwrap();

    assert_eq!(stored.file_path, images.join("1700000000-abcdefgh-xz.png"));
    assert_eq!(stored.public_path, "/images/1700000000-abcdefgh-xz.png");
    assert_eq!(std::fs::read(&stored.file_path).unwrap(), b"png");
}

#[test]
fn test_write_failure_is_cache_error() {
    let dir = temp_test_dir();
    // a regular file where the directory should be
    let blocker = dir.path().join("images");
    std::fs::write(&blocker, b"").unwrap();
    let cache = RenderCache::new(&blocker, "/images/", DEFAULT_TTL);

    let err = cache.write_image("x-yz.png", b"png").unwrap_err();
    assert!(matches!(err, OvenError::CacheError(_)));
}

#[test]
fn test_store_batch_sweeps_then_writes() {
    let dir = temp_test_dir();
    let stale = write_aged_file(&dir.path().join("1-zzzzzzzz-xy.png"), 20 * MINUTE);
    let cache = RenderCache::new(dir.path(), "/images/", DEFAULT_TTL);

    let batch = vec![
        (ArtifactName::new(42, "abcdefgh", ArtifactFamily::Xy), b"one".to_vec()),
        (
            ArtifactName::new(
                42,
                "abcdefgh",
                ArtifactFamily::Rack(RackLevel::Bottom, SensorKind::DistributedProbe),
            ),
            b"two".to_vec(),
        ),
    ];
    let stored = cache.store_batch(batch).unwrap();

    assert!(!stale.exists());
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].public_path, "/images/42-abcdefgh-xy.png");
    assert_eq!(stored[1].public_path, "/images/42-abcdefgh-bottom-nchc.png");
    assert!(stored.iter().all(|s| s.file_path.exists()));
}

#[test]
fn test_concurrent_batches_complete() {
    let dir = temp_test_dir();
    // zero TTL: each batch sweeps whatever earlier batches wrote
    let cache = Arc::new(RenderCache::new(dir.path(), "/images/", Duration::ZERO));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let name = ArtifactName::new(i, format!("token{:03}", i), ArtifactFamily::Yz);
                cache.store_batch(vec![(name, vec![i as u8])]).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let stored = handle.join().unwrap();
        assert_eq!(stored.len(), 1);
    }
}
