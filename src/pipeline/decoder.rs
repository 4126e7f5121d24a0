//! Frame decoder seam.
//!
//! Decoding video is delegated to an implementation of [`FrameDecoder`].
//! The crate ships [`FfmpegDecoder`](super::FfmpegDecoder); hosts with a
//! platform media API implement the trait themselves and hand it to
//! [`VidthumbBuilder::decoder`](crate::VidthumbBuilder::decoder).
//!
//! # Example
//!
//! ```ignore
//! #[async_trait]
//! impl FrameDecoder for PlatformDecoder {
//!     fn name(&self) -> &str { "platform" }
//!
//!     async fn decode_frame(
//!         &self,
//!         source: &MediaSource,
//!         at_micros: u64,
//!         policy: SeekPolicy,
//!     ) -> Result<DynamicImage> {
//!         // ... open source, seek, grab one frame
//!     }
//! }
//! ```

use async_trait::async_trait;
use image::DynamicImage;

use super::MediaSource;
use crate::Result;

/// How precisely the decoder should hit the requested instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekPolicy {
    /// Nearest sync sample (keyframe). Fast, possibly off by a GOP.
    #[default]
    ClosestSync,
    /// Decode forward from the keyframe to the exact instant.
    Exact,
}

/// Produces one raster frame from a media source.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    /// Decoder name for logging/debugging.
    fn name(&self) -> &str;

    /// Whether network sources can be opened.
    ///
    /// Returning `false` makes remote requests fail with
    /// `UnsupportedSource` before the decoder is called.
    fn supports_remote(&self) -> bool {
        true
    }

    /// Decode the frame nearest `at_micros` microseconds into the media.
    ///
    /// Returns `Decode` if the source cannot be opened or yields no frame.
    async fn decode_frame(
        &self,
        source: &MediaSource,
        at_micros: u64,
        policy: SeekPolicy,
    ) -> Result<DynamicImage>;
}
