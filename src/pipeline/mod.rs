//! Cold-path extraction: source → frame → encoded cache entry.
//!
//! [`ExtractionPipeline`] produces exactly one [`CacheEntry`] per call:
//!
//! 1. [`resolve_source`](ExtractionPipeline::resolve_source): local path or
//!    remote URL, refusing remote sources the decoder cannot open.
//! 2. [`decode_frame`](ExtractionPipeline::decode_frame): seconds become
//!    microseconds, the decoder seeks with the configured [`SeekPolicy`].
//! 3. [`encode_and_store`](ExtractionPipeline::encode_and_store): encode on
//!    the blocking pool and publish atomically under the key.

mod decoder;
pub mod encode;
mod ffmpeg;
mod source;

pub use decoder::{FrameDecoder, SeekPolicy};
pub use ffmpeg::FfmpegDecoder;
pub use source::MediaSource;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use tracing::{debug, instrument};

use crate::cache::{CacheEntry, CacheKey};
use crate::telemetry;
use crate::types::{CaptureInstant, SourceKind, ThumbnailRequest};
use crate::{Result, ThumbnailError};

/// Decode + encode + store for cache misses.
#[derive(Clone)]
pub struct ExtractionPipeline {
    decoder: Arc<dyn FrameDecoder>,
    seek_policy: SeekPolicy,
    decode_timeout: Option<Duration>,
}

impl ExtractionPipeline {
    pub fn new(decoder: Arc<dyn FrameDecoder>) -> Self {
        Self {
            decoder,
            seek_policy: SeekPolicy::default(),
            decode_timeout: None,
        }
    }

    pub fn seek_policy(mut self, policy: SeekPolicy) -> Self {
        self.seek_policy = policy;
        self
    }

    /// Bound decode time. Default: unbounded.
    pub fn decode_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.decode_timeout = timeout;
        self
    }

    pub fn decoder(&self) -> &dyn FrameDecoder {
        self.decoder.as_ref()
    }

    /// Turn a locator into a decoder input.
    pub fn resolve_source(&self, locator: &str, kind: SourceKind) -> Result<MediaSource> {
        let source = MediaSource::resolve(locator, kind);
        if source.is_remote() && !self.decoder.supports_remote() {
            return Err(ThumbnailError::UnsupportedSource(format!(
                "decoder '{}' cannot open remote sources ({locator})",
                self.decoder.name()
            )));
        }
        Ok(source)
    }

    /// Decode the frame nearest `capture`.
    pub async fn decode_frame(
        &self,
        source: &MediaSource,
        capture: CaptureInstant,
    ) -> Result<DynamicImage> {
        let decode = self
            .decoder
            .decode_frame(source, capture.as_micros(), self.seek_policy);
        match self.decode_timeout {
            None => decode.await,
            Some(limit) => tokio::time::timeout(limit, decode).await.map_err(|_| {
                ThumbnailError::Decode(format!("decoding {source} timed out after {limit:?}"))
            })?,
        }
    }

    /// Encode on the blocking pool and publish as `root/key`.
    pub async fn encode_and_store(
        &self,
        image: DynamicImage,
        root: &Path,
        key: &CacheKey,
    ) -> Result<CacheEntry> {
        let root = root.to_path_buf();
        let key = key.clone();
        tokio::task::spawn_blocking(move || encode::encode_and_store(&image, &root, &key)).await?
    }

    /// Run the whole cold path for one request.
    #[instrument(
        skip(self, request, root, key),
        fields(operation = "extract", key = %key, decoder = self.decoder.name())
    )]
    pub async fn extract(
        &self,
        request: &ThumbnailRequest,
        root: &Path,
        key: &CacheKey,
    ) -> Result<CacheEntry> {
        let start = Instant::now();
        let source = self.resolve_source(&request.locator, request.kind)?;
        let frame = self.decode_frame(&source, request.capture).await?;
        debug!(width = frame.width(), height = frame.height(), "decoded frame");
        let entry = self.encode_and_store(frame, root, key).await?;

        metrics::histogram!(telemetry::EXTRACTION_DURATION_SECONDS,
            "format" => key.format().extension())
        .record(start.elapsed().as_secs_f64());
        debug!(bytes = entry.len, "stored thumbnail");
        Ok(entry)
    }
}

impl std::fmt::Debug for ExtractionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("decoder", &self.decoder.name())
            .field("seek_policy", &self.seek_policy)
            .field("decode_timeout", &self.decode_timeout)
            .finish()
    }
}
