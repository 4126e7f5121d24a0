//! Frame decoder backed by the `ffmpeg` executable.
//!
//! One subprocess per request: seek on the input, emit exactly one frame as
//! PPM on stdout, parse it with the `image` crate. With
//! [`SeekPolicy::ClosestSync`] the seek is an input seek with
//! `-noaccurate_seek`, so ffmpeg stops at the keyframe before the instant
//! instead of decoding forward to it.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::process::Command;
use tracing::debug;

use super::{FrameDecoder, MediaSource, SeekPolicy};
use crate::{Result, ThumbnailError};

/// Decoder that shells out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: PathBuf,
}

impl FfmpegDecoder {
    /// Use `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Use a specific ffmpeg binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn command(&self, source: &MediaSource, at_micros: u64, policy: SeekPolicy) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error"]);
        if policy == SeekPolicy::ClosestSync {
            cmd.arg("-noaccurate_seek");
        }
        cmd.arg("-ss")
            .arg(seek_arg(at_micros))
            .arg("-i")
            .arg(source.as_os_str())
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "ppm", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameDecoder for FfmpegDecoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn decode_frame(
        &self,
        source: &MediaSource,
        at_micros: u64,
        policy: SeekPolicy,
    ) -> Result<DynamicImage> {
        debug!(%source, at_micros, ?policy, "running ffmpeg");
        let output = self
            .command(source, at_micros, policy)
            .output()
            .await
            .map_err(|e| {
                ThumbnailError::Decode(format!(
                    "failed to execute {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThumbnailError::Decode(format!(
                "ffmpeg failed on {source}: {}",
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(ThumbnailError::Decode(format!(
                "no frame at {} in {source}",
                seek_arg(at_micros)
            )));
        }

        let frame = output.stdout;
        tokio::task::spawn_blocking(move || {
            image::load_from_memory_with_format(&frame, ImageFormat::Pnm)
                .map_err(|e| ThumbnailError::Decode(format!("unreadable frame from ffmpeg: {e}")))
        })
        .await?
    }
}

/// Microseconds as an ffmpeg `-ss` value (`S.ffffff`).
fn seek_arg(at_micros: u64) -> String {
    format!("{}.{:06}", at_micros / 1_000_000, at_micros % 1_000_000)
}
