//! Output image encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ThumbnailError;

/// Encoding of a cached thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG at [`OutputFormat::JPEG_QUALITY`].
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// Fixed JPEG quality (0-100).
    pub const JPEG_QUALITY: u8 = 90;

    /// File extension, also used as the cache key suffix.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    /// Parse a host-supplied format string.
    ///
    /// Comparison is by value and ignores ASCII case. Anything other than
    /// `png` falls back to JPEG.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("png") {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ThumbnailError;

    /// Strict parse: only `jpeg`, `jpg` and `png` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            other => Err(ThumbnailError::InvalidInput(format!(
                "unknown output format '{other}' (expected jpeg or png)"
            ))),
        }
    }
}
