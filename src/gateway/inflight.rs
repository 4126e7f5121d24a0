//! Per-key coalescing of concurrent extractions.
//!
//! Uses moka's `try_get_with`, which runs one initializer per key and parks
//! every other caller for that key on the same result. The marker is
//! invalidated as soon as the extraction settles, so nothing is retained
//! between requests; the directory stays the only source of truth.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use moka::future::Cache;
use tracing::debug;

use crate::cache::{CacheEntry, CacheKey};
use crate::telemetry;
use crate::{Result, ThumbnailError};

pub(crate) struct InFlight {
    pending: Cache<String, CacheEntry>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self {
            pending: Cache::builder().build(),
        }
    }

    /// Run `extract` unless an extraction for `key` is already running, in
    /// which case wait for that one instead.
    pub(crate) async fn run<F>(&self, key: &CacheKey, extract: F) -> Result<CacheEntry>
    where
        F: Future<Output = Result<CacheEntry>>,
    {
        let leader = AtomicBool::new(false);
        let outcome = self
            .pending
            .try_get_with(key.as_str().to_owned(), async {
                leader.store(true, Ordering::Relaxed);
                extract.await
            })
            .await;
        self.pending.invalidate(key.as_str()).await;

        if !leader.load(Ordering::Relaxed) {
            metrics::counter!(telemetry::COALESCED_REQUESTS_TOTAL).increment(1);
            debug!(key = %key, "joined in-flight extraction");
        }
        outcome.map_err(|e| ThumbnailError::clone(&e))
    }
}
