//! ThumbnailService - coordinates the store and the extraction pipeline

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::inflight::InFlight;
use crate::cache::{CacheEntry, CacheKey, CacheStats, CacheStore, EvictionReport};
use crate::pipeline::ExtractionPipeline;
use crate::telemetry;
use crate::{Result, ThumbnailGateway, ThumbnailRequest, ThumbnailResult};

/// Request coordinator over one cache root.
///
/// Per request: ensure the root, enforce the budget, look the key up, and
/// fall back to the extraction pipeline on a miss. Filesystem work and
/// encoding run on tokio's blocking pool; callers only ever await.
pub struct ThumbnailService {
    store: CacheStore,
    pipeline: ExtractionPipeline,
    inflight: InFlight,
}

impl ThumbnailService {
    pub(crate) fn new(store: CacheStore, pipeline: ExtractionPipeline) -> Self {
        Self {
            store,
            pipeline,
            inflight: InFlight::new(),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn pipeline(&self) -> &ExtractionPipeline {
        &self.pipeline
    }

    /// Produce (or reuse) the thumbnail for `request`.
    ///
    /// Exactly one outcome is reported: a complete result or a single error.
    #[instrument(
        skip(self, request),
        fields(operation = "create", kind = %request.kind, format = %request.format)
    )]
    pub async fn create(&self, request: ThumbnailRequest) -> Result<ThumbnailResult> {
        let outcome = self.create_inner(&request).await;
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => status).increment(1);
        if let Err(ref e) = outcome {
            warn!(code = e.code(), error = %e, "thumbnail request failed");
        }
        outcome
    }

    async fn create_inner(&self, request: &ThumbnailRequest) -> Result<ThumbnailResult> {
        let key = CacheKey::derive(&request.locator, request.format);
        let format = key.format().extension();

        let store = self.store.clone();
        let lookup_key = key.clone();
        let hit = tokio::task::spawn_blocking(move || store.prepare(&lookup_key)).await??;

        if let Some(entry) = hit {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "format" => format).increment(1);
            debug!(key = %key, "cache hit");
            return Ok(into_result(entry));
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "format" => format).increment(1);
        debug!(key = %key, "cache miss");
        let entry = self
            .inflight
            .run(&key, self.extract_or_reuse(request, &key))
            .await?;
        Ok(into_result(entry))
    }

    /// Extraction step run once per key by [`InFlight`].
    ///
    /// A previous leader for the same key may have finished between our
    /// lookup and taking the slot, so the directory is checked again first.
    async fn extract_or_reuse(
        &self,
        request: &ThumbnailRequest,
        key: &CacheKey,
    ) -> Result<CacheEntry> {
        let store = self.store.clone();
        let lookup_key = key.clone();
        if let Some(entry) =
            tokio::task::spawn_blocking(move || store.lookup_entry(&lookup_key)).await??
        {
            debug!(key = %key, "entry appeared while waiting for extraction slot");
            return Ok(entry);
        }
        self.pipeline.extract(request, self.store.root(), key).await
    }

    /// Run the eviction sweep now, outside of any request.
    pub async fn evict(&self) -> Result<EvictionReport> {
        let store = self.store.clone();
        Ok(tokio::task::spawn_blocking(move || store.evict_if_over_budget()).await?)
    }

    /// Entry count and total size of the cache directory.
    pub async fn stats(&self) -> Result<CacheStats> {
        let store = self.store.clone();
        Ok(tokio::task::spawn_blocking(move || store.stats()).await?)
    }

    /// Delete every cached entry and abandoned staging file.
    pub async fn clear(&self) -> Result<EvictionReport> {
        let store = self.store.clone();
        Ok(tokio::task::spawn_blocking(move || store.clear()).await?)
    }
}

fn into_result(entry: CacheEntry) -> ThumbnailResult {
    ThumbnailResult::new(entry.path, entry.width, entry.height)
}

#[async_trait]
impl ThumbnailGateway for ThumbnailService {
    async fn create(&self, request: ThumbnailRequest) -> Result<ThumbnailResult> {
        ThumbnailService::create(self, request).await
    }

    fn cache_root(&self) -> &Path {
        self.store.root()
    }
}

impl std::fmt::Debug for ThumbnailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailService")
            .field("store", &self.store)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::{DynamicImage, RgbImage};

    use super::*;
    use crate::cache::CacheConfig;
    use crate::pipeline::encode;
    use crate::{FrameDecoder, MediaSource, OutputFormat, SeekPolicy};

    #[derive(Default)]
    struct CountingDecoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FrameDecoder for CountingDecoder {
        fn name(&self) -> &str {
            "counting"
        }

        async fn decode_frame(
            &self,
            _source: &MediaSource,
            _at_micros: u64,
            _policy: SeekPolicy,
        ) -> Result<DynamicImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DynamicImage::ImageRgb8(RgbImage::new(6, 4)))
        }
    }

    fn service(root: &Path, decoder: Arc<CountingDecoder>) -> ThumbnailService {
        ThumbnailService::new(
            CacheStore::new(&CacheConfig::new().root(root)),
            ExtractionPipeline::new(decoder),
        )
    }

    #[tokio::test]
    async fn extraction_slot_reuses_entry_written_by_previous_leader() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(CountingDecoder::default());
        let service = service(dir.path(), decoder.clone());
        let request = ThumbnailRequest::new("https://example.com/a.mp4");
        let key = CacheKey::derive(&request.locator, OutputFormat::Jpeg);

        // a leader that finished after our own lookup missed
        let image = DynamicImage::ImageRgb8(RgbImage::new(20, 10));
        let written = encode::encode_and_store(&image, dir.path(), &key).unwrap();

        let entry = service.extract_or_reuse(&request, &key).await.unwrap();
        assert_eq!(entry, written);
        assert_eq!((entry.width, entry.height), (20, 10));
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extraction_slot_decodes_when_nothing_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(CountingDecoder::default());
        let service = service(dir.path(), decoder.clone());
        let request = ThumbnailRequest::new("https://example.com/a.mp4");
        let key = CacheKey::derive(&request.locator, OutputFormat::Jpeg);

        let entry = service.extract_or_reuse(&request, &key).await.unwrap();
        assert_eq!((entry.width, entry.height), (6, 4));
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 1);
    }
}
