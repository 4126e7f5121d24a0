//! On-disk thumbnail cache.
//!
//! Two pieces:
//!
//! - [`key`] maps a `(locator, format)` pair onto a stable file name,
//!   `thumb-<md5 hex>.<ext>`. The capture instant is not part
//!   of the key: one thumbnail per source and format.
//!
//! - [`store`] owns one flat directory of entries. The directory listing
//!   is the only index; every lookup and eviction re-reads the filesystem,
//!   so several processes may share a root.
//!
//! # Budget
//!
//! The store enforces a soft byte budget lazily, once per request, before
//! any lookup. When the directory is over budget, entries are deleted oldest
//! modification time first until the directory is back down to half the
//! budget. Recency is approximated by mtime, which is only set when an entry
//! is written.

pub mod key;
pub mod store;

pub use key::{CacheKey, derive_key};
pub use store::{CacheEntry, CacheStats, CacheStore, EvictionReport};

use std::path::PathBuf;

/// Default cache budget: 100 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// Environment variable overriding the application cache directory.
pub const CACHE_DIR_ENV: &str = "VIDTHUMB_CACHE_DIR";

/// Name of the thumbnail directory inside the application cache directory.
pub const THUMBNAIL_DIR: &str = "thumbnails";

/// Configuration for the thumbnail store.
///
/// ```rust
/// # use vidthumb::CacheConfig;
/// let config = CacheConfig::new()
///     .root("/tmp/vidthumb/thumbnails")
///     .max_bytes(16 * 1024 * 1024)
///     .verify_on_lookup(true);
/// assert_eq!(config.max_bytes, 16 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the entries. Default: `<cache dir>/vidthumb/thumbnails`.
    pub root: PathBuf,
    /// Soft byte budget for the whole directory. Default: 100 MiB.
    pub max_bytes: u64,
    /// Probe cached files on lookup and regenerate unreadable ones. Default: off.
    pub verify_on_lookup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            max_bytes: DEFAULT_MAX_BYTES,
            verify_on_lookup: false,
        }
    }
}

impl CacheConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the byte budget.
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Enable or disable validation of cached files on lookup.
    pub fn verify_on_lookup(mut self, enabled: bool) -> Self {
        self.verify_on_lookup = enabled;
        self
    }
}

/// Default entry directory.
///
/// `$VIDTHUMB_CACHE_DIR/thumbnails` when set, otherwise the platform cache
/// directory joined with `vidthumb/thumbnails`.
pub fn default_root() -> PathBuf {
    std::env::var(CACHE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("vidthumb")
        })
        .join(THUMBNAIL_DIR)
}
