//! Filesystem-backed bounded store.
//!
//! The free functions take the root explicitly and hold no state; the
//! [`CacheStore`] handle bundles a root with its budget and is cheap to
//! clone onto blocking threads.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use super::{CacheConfig, CacheKey};
use crate::telemetry;
use crate::types::OutputFormat;
use crate::{Result, ThumbnailError};

/// Name prefix of files still being written. They count toward the
/// aggregate size, and are only deleted once older than [`STALE_TEMP_AGE`].
pub const TEMP_PREFIX: &str = ".thumb-tmp";

/// Age after which a staging file is treated as left behind by a crashed
/// writer. Encoding one thumbnail never takes this long.
pub const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// A cache entry present on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: PathBuf,
    /// Size of the encoded file in bytes.
    pub len: u64,
    pub width: u32,
    pub height: u32,
}

/// Outcome of an eviction sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Aggregate size seen before the sweep.
    pub size_before: u64,
    pub entries_removed: usize,
    pub bytes_freed: u64,
    /// Entries that could not be deleted.
    pub failures: usize,
}

impl EvictionReport {
    /// Whether the sweep ran at all.
    pub fn evicted(&self) -> bool {
        self.entries_removed > 0 || self.failures > 0
    }
}

/// Snapshot of the cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    /// Staging files present, in progress or abandoned.
    pub staging_files: usize,
    pub staging_bytes: u64,
}

/// Create the cache root if it does not exist.
pub fn ensure_root(root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(root).map_err(|e| {
        ThumbnailError::Storage(format!(
            "cannot create cache directory {}: {e}",
            root.display()
        ))
    })?;
    Ok(root.to_path_buf())
}

/// Sum of the byte lengths of regular files directly under `root`.
///
/// Not recursive. Unreadable entries are skipped; a missing root is empty.
pub fn aggregate_size(root: &Path) -> u64 {
    regular_files(root).map(|file| file.len).sum()
}

/// Delete the oldest entries if `root` holds more than `max_bytes`.
///
/// Entries go oldest modification time first (ties by name) until the
/// directory is down to `max_bytes / 2`, which always frees at least half
/// the budget. Staging files are candidates only once stale. Deletion
/// failures are logged and skipped.
pub fn evict_if_over_budget(root: &Path, max_bytes: u64) -> EvictionReport {
    let size_before = aggregate_size(root);
    let mut report = EvictionReport {
        size_before,
        ..Default::default()
    };
    if size_before <= max_bytes {
        return report;
    }

    let half = max_bytes / 2;
    let target = half.max(size_before - half);

    let now = SystemTime::now();
    let mut candidates: Vec<FileInfo> = regular_files(root)
        .filter(|file| is_reclaimable(file, now))
        .collect();
    candidates.sort_by(|a, b| {
        a.modified
            .cmp(&b.modified)
            .then_with(|| a.path.cmp(&b.path))
    });

    for file in candidates {
        if report.bytes_freed >= target {
            break;
        }
        match fs::remove_file(&file.path) {
            Ok(()) => {
                report.entries_removed += 1;
                report.bytes_freed += file.len;
            }
            Err(e) => {
                report.failures += 1;
                warn!(path = %file.path.display(), error = %e, "failed to evict cache entry");
            }
        }
    }

    metrics::counter!(telemetry::EVICTIONS_TOTAL).increment(report.entries_removed as u64);
    metrics::counter!(telemetry::EVICTED_BYTES_TOTAL).increment(report.bytes_freed);
    info!(
        size_before,
        max_bytes,
        removed = report.entries_removed,
        freed = report.bytes_freed,
        failures = report.failures,
        "evicted thumbnail cache entries"
    );
    report
}

/// Path of the entry named `key` if it exists as a regular file.
///
/// The file's contents are not checked.
pub fn lookup(root: &Path, key: &str) -> Option<PathBuf> {
    let path = root.join(key);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Some(path),
        _ => None,
    }
}

/// Read pixel dimensions from an image header without decoding pixels.
pub fn probe_dimensions(path: &Path, format: OutputFormat) -> Result<(u32, u32)> {
    let mut reader = image::ImageReader::open(path).map_err(|e| {
        ThumbnailError::Decode(format!("cannot open {}: {e}", path.display()))
    })?;
    reader.set_format(format.image_format());
    reader.into_dimensions().map_err(|e| {
        ThumbnailError::Decode(format!(
            "{} is not a valid {format} image: {e}",
            path.display()
        ))
    })
}

/// Handle on one cache root and its budget.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    max_bytes: u64,
    verify_on_lookup: bool,
}

impl CacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            root: config.root.clone(),
            max_bytes: config.max_bytes,
            verify_on_lookup: config.verify_on_lookup,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn ensure_root(&self) -> Result<PathBuf> {
        ensure_root(&self.root)
    }

    pub fn aggregate_size(&self) -> u64 {
        aggregate_size(&self.root)
    }

    pub fn evict_if_over_budget(&self) -> EvictionReport {
        evict_if_over_budget(&self.root, self.max_bytes)
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<PathBuf> {
        lookup(&self.root, key.as_str())
    }

    /// Per-request preamble: ensure the root, enforce the budget, then look
    /// the key up and read the hit's dimensions.
    ///
    /// With `verify_on_lookup` an unreadable hit is deleted and reported as
    /// a miss; otherwise the dimension error is returned.
    pub fn prepare(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        self.ensure_root()?;
        self.evict_if_over_budget();
        self.lookup_entry(key)
    }

    /// Look the key up and read the hit's dimensions, without touching the
    /// budget. Unreadable hits follow the same rules as [`Self::prepare`].
    pub fn lookup_entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let Some(path) = self.lookup(key) else {
            return Ok(None);
        };

        match probe_dimensions(&path, key.format()) {
            Ok((width, height)) => {
                let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                Ok(Some(CacheEntry {
                    path,
                    len,
                    width,
                    height,
                }))
            }
            Err(e) if self.verify_on_lookup => {
                warn!(key = %key, error = %e, "discarding unreadable cache entry");
                if let Err(e) = fs::remove_file(&path) {
                    debug!(key = %key, error = %e, "could not remove unreadable entry");
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Count and size of the finished entries and of staging files.
    pub fn stats(&self) -> CacheStats {
        regular_files(&self.root).fold(CacheStats::default(), |mut stats, file| {
            if is_temp_file(&file.path) {
                stats.staging_files += 1;
                stats.staging_bytes += file.len;
            } else {
                stats.entries += 1;
                stats.total_bytes += file.len;
            }
            stats
        })
    }

    /// Remove every finished entry and every stale staging file,
    /// best-effort. Staging files still being written are left alone.
    pub fn clear(&self) -> EvictionReport {
        let mut report = EvictionReport {
            size_before: self.aggregate_size(),
            ..Default::default()
        };
        let now = SystemTime::now();
        for file in regular_files(&self.root).filter(|file| is_reclaimable(file, now)) {
            match fs::remove_file(&file.path) {
                Ok(()) => {
                    report.entries_removed += 1;
                    report.bytes_freed += file.len;
                }
                Err(e) => {
                    report.failures += 1;
                    warn!(path = %file.path.display(), error = %e, "failed to remove cache entry");
                }
            }
        }
        report
    }
}

struct FileInfo {
    path: PathBuf,
    len: u64,
    modified: SystemTime,
}

fn regular_files(root: &Path) -> impl Iterator<Item = FileInfo> {
    fs::read_dir(root)
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            Some(FileInfo {
                path: entry.path(),
                len: meta.len(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            })
        })
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(TEMP_PREFIX))
}

/// Finished entries always; staging files once older than [`STALE_TEMP_AGE`].
fn is_reclaimable(file: &FileInfo, now: SystemTime) -> bool {
    if !is_temp_file(&file.path) {
        return true;
    }
    // mtime in the future: still being written as far as we can tell
    now.duration_since(file.modified)
        .is_ok_and(|age| age >= STALE_TEMP_AGE)
}
