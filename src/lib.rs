//! vidthumb - Cached video thumbnail extraction
//!
//! Given a video locator (local path or remote URL), a capture instant and an
//! output format, this crate decodes one frame, encodes it as JPEG or PNG and
//! stores it in a size-bounded on-disk cache. Repeated requests for the same
//! locator and format are served from the cache without decoding.
//!
//! # Example
//!
//! ```rust,no_run
//! use vidthumb::{OutputFormat, ThumbnailGateway, ThumbnailRequest, Vidthumb};
//!
//! #[tokio::main]
//! async fn main() -> vidthumb::Result<()> {
//!     let service = Vidthumb::builder()
//!         .cache_dir("/tmp/vidthumb")
//!         .build()?;
//!
//!     let thumb = service
//!         .create(
//!             ThumbnailRequest::new("https://example.com/clip.mp4")
//!                 .at_secs(2)
//!                 .format(OutputFormat::Png),
//!         )
//!         .await?;
//!
//!     println!("{} ({}x{})", thumb.path, thumb.width, thumb.height);
//!     Ok(())
//! }
//! ```
//!
//! # Host JSON requests
//!
//! ```rust,no_run
//! use vidthumb::{ThumbnailGateway, Vidthumb};
//!
//! # async fn run() -> vidthumb::Result<()> {
//! let worker = Vidthumb::builder().build_worker()?;
//! let thumb = worker
//!     .create_json(r#"{"url":"file:///videos/a.mp4","type":"local","timeStamp":5}"#)
//!     .await?;
//! println!("{}", serde_json::to_string(&thumb)?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod telemetry;
pub mod traits;
pub mod types;
mod version;

// Re-export main types at crate root
pub use error::{ERROR_CODE, Result, ThumbnailError};
pub use gateway::{
    PendingThumbnail, ThumbnailService, ThumbnailWorker, Vidthumb, VidthumbBuilder, WorkerConfig,
};
pub use traits::ThumbnailGateway;

pub use cache::{CacheConfig, CacheKey, CacheStore, derive_key};
pub use pipeline::{ExtractionPipeline, FfmpegDecoder, FrameDecoder, MediaSource, SeekPolicy};

pub use types::{
    CaptureInstant, ErrorReport, OutputFormat, RawRequest, SourceKind, ThumbnailRequest,
    ThumbnailResult, file_uri,
};

pub use version::{PKG_VERSION, banner, version_string};
