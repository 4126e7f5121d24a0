//! Builder for configuring thumbnail services

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::ThumbnailService;
use super::worker::{ThumbnailWorker, WorkerConfig};
use crate::cache::{CacheConfig, CacheStore};
use crate::pipeline::{ExtractionPipeline, FfmpegDecoder, FrameDecoder, SeekPolicy};
use crate::{Result, ThumbnailError};

/// Main entry point for creating thumbnail services.
pub struct Vidthumb;

impl Vidthumb {
    /// Create a new builder for configuring the service.
    pub fn builder() -> VidthumbBuilder {
        VidthumbBuilder::new()
    }
}

/// Builder for configuring thumbnail services.
///
/// ```rust,no_run
/// # use vidthumb::Vidthumb;
/// let service = Vidthumb::builder()
///     .cache_dir("/var/cache/app/thumbnails")
///     .max_bytes(50 * 1024 * 1024)
///     .build()?;
/// # Ok::<(), vidthumb::ThumbnailError>(())
/// ```
pub struct VidthumbBuilder {
    cache: CacheConfig,
    decoder: Option<Arc<dyn FrameDecoder>>,
    ffmpeg_path: Option<PathBuf>,
    seek_policy: SeekPolicy,
    decode_timeout: Option<Duration>,
    worker: WorkerConfig,
}

impl VidthumbBuilder {
    pub fn new() -> Self {
        Self {
            cache: CacheConfig::default(),
            decoder: None,
            ffmpeg_path: None,
            seek_policy: SeekPolicy::default(),
            decode_timeout: None,
            worker: WorkerConfig::default(),
        }
    }

    /// Replace the whole cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the directory entries are stored in.
    pub fn cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache.root = path.into();
        self
    }

    /// Set the soft byte budget (default: 100 MiB).
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.cache.max_bytes = bytes;
        self
    }

    /// Probe cached files on lookup and regenerate unreadable ones.
    pub fn verify_on_lookup(mut self, enabled: bool) -> Self {
        self.cache.verify_on_lookup = enabled;
        self
    }

    /// Use a custom frame decoder instead of ffmpeg.
    pub fn decoder(mut self, decoder: Arc<dyn FrameDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Path of the ffmpeg binary for the default decoder.
    ///
    /// Ignored when a custom decoder is set.
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    /// Set the seek policy (default: closest sync sample).
    pub fn seek_policy(mut self, policy: SeekPolicy) -> Self {
        self.seek_policy = policy;
        self
    }

    /// Fail decodes that take longer than `timeout`.
    pub fn decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout = Some(timeout);
        self
    }

    /// Number of requests a worker processes at once (default: 1).
    pub fn worker_concurrency(mut self, n: usize) -> Self {
        self.worker.concurrency = n;
        self
    }

    /// Worker queue length (default: 64).
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.worker.queue_capacity = n;
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<ThumbnailService> {
        self.into_parts().map(|(service, _)| service)
    }

    /// Build the service and spawn a background worker around it.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn build_worker(self) -> Result<ThumbnailWorker> {
        let (service, worker) = self.into_parts()?;
        Ok(ThumbnailWorker::spawn(Arc::new(service), worker))
    }

    fn into_parts(self) -> Result<(ThumbnailService, WorkerConfig)> {
        if self.cache.max_bytes == 0 {
            return Err(ThumbnailError::Configuration(
                "cache budget must be greater than zero".to_string(),
            ));
        }
        if self.cache.root.as_os_str().is_empty() {
            return Err(ThumbnailError::Configuration(
                "cache directory must not be empty".to_string(),
            ));
        }

        let decoder = self.decoder.unwrap_or_else(|| {
            let ffmpeg = match self.ffmpeg_path {
                Some(path) => FfmpegDecoder::with_program(path),
                None => FfmpegDecoder::new(),
            };
            Arc::new(ffmpeg)
        });

        let pipeline = ExtractionPipeline::new(decoder)
            .seek_policy(self.seek_policy)
            .decode_timeout(self.decode_timeout);
        let store = CacheStore::new(&self.cache);

        Ok((ThumbnailService::new(store, pipeline), self.worker))
    }
}

impl Default for VidthumbBuilder {
    fn default() -> Self {
        Self::new()
    }
}
