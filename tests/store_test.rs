//! Tests for the filesystem store: sizing, eviction order and lookup.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use image::{DynamicImage, RgbImage};

use vidthumb::cache::store::{self, TEMP_PREFIX};
use vidthumb::cache::{CacheConfig, CacheKey, CacheStore};
use vidthumb::pipeline::encode;
use vidthumb::{OutputFormat, ThumbnailError};

// ============================================================================
// Helpers
// ============================================================================

fn write_entry(root: &Path, name: &str, len: u64, mtime_secs: u64) {
    let file = File::create(root.join(name)).unwrap();
    file.set_len(len).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

/// A staging file that was just written, as if an encode were in progress.
fn write_fresh(root: &Path, name: &str, len: u64) {
    File::create(root.join(name)).unwrap().set_len(len).unwrap();
}

fn exists(root: &Path, name: &str) -> bool {
    root.join(name).exists()
}

fn store_at(root: &Path, max_bytes: u64) -> CacheStore {
    CacheStore::new(&CacheConfig::new().root(root).max_bytes(max_bytes))
}

// ============================================================================
// Sizing and lookup
// ============================================================================

#[test]
fn ensure_root_creates_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app").join("thumbnails");

    let created = store::ensure_root(&root).unwrap();
    assert_eq!(created, root);
    assert!(root.is_dir());
    // idempotent
    store::ensure_root(&root).unwrap();
}

#[test]
fn ensure_root_fails_when_blocked_by_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("thumbnails");
    fs::write(&blocker, b"file").unwrap();

    let err = store::ensure_root(&blocker.join("inner")).unwrap_err();
    assert!(matches!(err, ThumbnailError::Storage(_)));
}

#[test]
fn aggregate_size_counts_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    write_entry(dir.path(), "thumb-a.jpeg", 100, 10);
    write_entry(dir.path(), &format!("{TEMP_PREFIX}x.part"), 30, 20);
    assert_eq!(store::aggregate_size(dir.path()), 130);
}

#[test]
fn lookup_finds_existing_entry() {
    let dir = tempfile::tempdir().unwrap();
    let key = CacheKey::derive("https://example.com/a.mp4", OutputFormat::Jpeg);
    write_entry(dir.path(), key.as_str(), 10, 10);

    let store = store_at(dir.path(), 1024);
    assert_eq!(store.lookup(&key), Some(dir.path().join(key.as_str())));

    let other = CacheKey::derive("https://example.com/a.mp4", OutputFormat::Png);
    assert_eq!(store.lookup(&other), None);
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn evicts_oldest_first_down_to_half_budget() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_entry(root, "c", 40, 300);
    write_entry(root, "a", 40, 100);
    write_entry(root, "b", 40, 200);

    // 120 > 100: free max(50, 120 - 50) = 70 bytes, oldest first
    let report = store::evict_if_over_budget(root, 100);

    assert_eq!(report.size_before, 120);
    assert_eq!(report.entries_removed, 2);
    assert_eq!(report.bytes_freed, 80);
    assert!(!exists(root, "a"));
    assert!(!exists(root, "b"));
    assert!(exists(root, "c"));
    assert_eq!(store::aggregate_size(root), 40);
}

#[test]
fn slightly_over_budget_still_drops_to_half() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for i in 0..10 {
        write_entry(root, &format!("e{i}"), 11, 100 + i);
    }

    // 110 is only 10 bytes over, but 60 must go to reach 50
    let report = store::evict_if_over_budget(root, 100);
    assert!(report.bytes_freed >= 50);
    assert_eq!(report.entries_removed, 6);
    assert_eq!(store::aggregate_size(root), 44);
    for i in 0..6 {
        assert!(!exists(root, &format!("e{i}")));
    }
    for i in 6..10 {
        assert!(exists(root, &format!("e{i}")));
    }
}

#[test]
fn equal_mtimes_evict_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_entry(root, "b", 45, 500);
    write_entry(root, "a", 60, 500);

    store::evict_if_over_budget(root, 100);
    assert!(!exists(root, "a"));
    assert!(exists(root, "b"));
}

#[test]
fn single_oversized_entry_is_evicted_entirely() {
    let dir = tempfile::tempdir().unwrap();
    write_entry(dir.path(), "huge", 1000, 10);

    let report = store::evict_if_over_budget(dir.path(), 100);
    assert_eq!(report.entries_removed, 1);
    assert_eq!(store::aggregate_size(dir.path()), 0);
}

#[test]
fn aggregate_is_within_budget_after_eviction() {
    let sizes: &[&[u64]] = &[
        &[10, 20, 30, 40, 50],
        &[99, 2],
        &[5; 40],
        &[70, 70, 70],
        &[1, 1, 1, 500],
    ];

    for (case, entries) in sizes.iter().enumerate() {
        let dir = tempfile::tempdir().unwrap();
        for (i, len) in entries.iter().enumerate() {
            write_entry(dir.path(), &format!("e{i:02}"), *len, 1_000 + i as u64);
        }

        store::evict_if_over_budget(dir.path(), 100);
        let after = store::aggregate_size(dir.path());
        let left = fs::read_dir(dir.path()).unwrap().count();
        assert!(
            after <= 100 || left == 0,
            "case {case}: {after} bytes in {left} entries"
        );
    }
}

#[test]
fn in_progress_temp_files_survive_eviction_but_count_toward_size() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let temp = format!("{TEMP_PREFIX}123.part");
    write_fresh(root, &temp, 80);
    write_entry(root, "thumb-a.jpeg", 40, 2);

    let report = store::evict_if_over_budget(root, 100);
    assert_eq!(report.size_before, 120);
    assert!(exists(root, &temp));
    assert!(!exists(root, "thumb-a.jpeg"));
}

#[test]
fn abandoned_temp_files_are_evicted_like_entries() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let temp = format!("{TEMP_PREFIX}crashed.part");
    // older than any grace period, so a crashed writer left it behind
    write_entry(root, &temp, 80, 1);
    write_entry(root, "thumb-a.jpeg", 40, 2);

    let report = store::evict_if_over_budget(root, 100);
    assert_eq!(report.entries_removed, 1);
    assert_eq!(report.bytes_freed, 80);
    assert!(!exists(root, &temp));
    assert!(exists(root, "thumb-a.jpeg"));
    assert_eq!(store::aggregate_size(root), 40);
}

#[test]
fn temp_file_just_past_grace_period_is_reclaimed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let temp = format!("{TEMP_PREFIX}old.part");
    let file = File::create(root.join(&temp)).unwrap();
    file.set_len(200).unwrap();
    file.set_modified(SystemTime::now() - store::STALE_TEMP_AGE - Duration::from_secs(5))
        .unwrap();

    let report = store::evict_if_over_budget(root, 100);
    assert_eq!(report.bytes_freed, 200);
    assert!(!exists(root, &temp));
}

#[test]
fn subdirectories_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("nested")).unwrap();
    write_entry(&root.join("nested"), "inner", 500, 1);
    write_entry(root, "a", 50, 2);

    let report = store::evict_if_over_budget(root, 100);
    assert!(!report.evicted());
    assert!(root.join("nested").join("inner").exists());
}

// ============================================================================
// CacheStore
// ============================================================================

#[test]
fn prepare_reports_hit_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_at(dir.path(), 1024 * 1024);
    let key = CacheKey::derive("https://example.com/a.mp4", OutputFormat::Png);

    let image = DynamicImage::ImageRgb8(RgbImage::new(48, 27));
    let stored = encode::encode_and_store(&image, dir.path(), &key).unwrap();

    let hit = store.prepare(&key).unwrap().unwrap();
    assert_eq!(hit, stored);
    assert_eq!((hit.width, hit.height), (48, 27));
}

#[test]
fn prepare_creates_root_and_misses() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("thumbnails");
    let store = store_at(&root, 1024);
    let key = CacheKey::derive("x", OutputFormat::Jpeg);

    assert_eq!(store.prepare(&key).unwrap(), None);
    assert!(root.is_dir());
}

#[test]
fn prepare_evicts_before_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let store = store_at(root, 100);
    let key = CacheKey::derive("https://example.com/a.mp4", OutputFormat::Jpeg);

    // the wanted entry is the oldest file, so the sweep removes it first
    write_entry(root, key.as_str(), 60, 1);
    write_entry(root, "newer", 45, 2);

    assert_eq!(store.prepare(&key).unwrap(), None);
    assert!(exists(root, "newer"));
}

#[test]
fn verified_prepare_discards_unreadable_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(
        &CacheConfig::new()
            .root(dir.path())
            .max_bytes(1024)
            .verify_on_lookup(true),
    );
    let key = CacheKey::derive("a", OutputFormat::Png);
    fs::write(dir.path().join(key.as_str()), b"garbage").unwrap();

    assert_eq!(store.prepare(&key).unwrap(), None);
    assert!(!exists(dir.path(), key.as_str()));
}

#[test]
fn stats_report_staging_files_separately() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_entry(root, "thumb-a.jpeg", 10, 1);
    write_entry(root, "thumb-b.png", 20, 2);
    write_entry(root, &format!("{TEMP_PREFIX}1.part"), 5, 3);
    write_fresh(root, &format!("{TEMP_PREFIX}2.part"), 7);

    let stats = store_at(root, 1024).stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.total_bytes, 30);
    assert_eq!(stats.staging_files, 2);
    assert_eq!(stats.staging_bytes, 12);
}

#[test]
fn clear_removes_abandoned_temp_files_but_not_active_ones() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let stale = format!("{TEMP_PREFIX}1.part");
    let active = format!("{TEMP_PREFIX}2.part");
    write_entry(root, "thumb-a.jpeg", 10, 1);
    write_entry(root, "thumb-b.png", 20, 2);
    write_entry(root, &stale, 5, 3);
    write_fresh(root, &active, 7);

    let store = store_at(root, 1024);
    let report = store.clear();
    assert_eq!(report.entries_removed, 3);
    assert_eq!(report.bytes_freed, 35);
    assert!(!exists(root, &stale));
    assert!(exists(root, &active));
    assert_eq!(store.stats().staging_bytes, 7);
}
