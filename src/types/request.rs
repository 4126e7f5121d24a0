//! Thumbnail request types and host-side normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::OutputFormat;
use crate::{Result, ThumbnailError};

/// Where the locator points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local filesystem path, optionally with a `file://` scheme.
    Local,
    /// Network URL handed straight to the decoder.
    #[default]
    Remote,
}

impl SourceKind {
    /// Parse a host-supplied source type. Anything other than `local` is remote.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("local") {
            SourceKind::Local
        } else {
            SourceKind::Remote
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Local => f.write_str("local"),
            SourceKind::Remote => f.write_str("remote"),
        }
    }
}

/// Requested playback instant, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaptureInstant(u64);

impl CaptureInstant {
    /// Seconds used when the request does not name an instant.
    pub const DEFAULT_SECS: u64 = 1;

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }

    /// Instant in microseconds, the unit decoders seek in.
    pub fn as_micros(self) -> u64 {
        self.0.saturating_mul(1_000_000)
    }
}

impl Default for CaptureInstant {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

/// A normalized thumbnail request.
///
/// ```rust
/// # use vidthumb::{OutputFormat, SourceKind, ThumbnailRequest};
/// let request = ThumbnailRequest::new("file:///sdcard/a.mp4")
///     .kind(SourceKind::Local)
///     .at_secs(5)
///     .format(OutputFormat::Png);
/// assert_eq!(request.capture.as_micros(), 5_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub locator: String,
    pub kind: SourceKind,
    pub capture: CaptureInstant,
    pub format: OutputFormat,
}

impl ThumbnailRequest {
    /// Request with defaults: remote source, 1 second, JPEG.
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            kind: SourceKind::default(),
            capture: CaptureInstant::default(),
            format: OutputFormat::default(),
        }
    }

    pub fn kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn at_secs(mut self, secs: u64) -> Self {
        self.capture = CaptureInstant::from_secs(secs);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Parse and normalize a JSON request in the host wire format.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<RawRequest>(json)?.normalize()
    }
}

/// Request as received from a host runtime, before defaults are applied.
///
/// Field names follow the host wire format (`url`, `type`, `format`,
/// `timeStamp`). Hosts send `timeStamp` as a JSON number, so `2`, `2.0`
/// and `2.9` are all accepted; fractional seconds are truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, rename = "timeStamp")]
    pub time_stamp: Option<f64>,
}

impl RawRequest {
    /// Apply defaults and validate.
    ///
    /// Missing fields take their defaults; unknown `type` and `format`
    /// values fall back to remote and JPEG. The timestamp is truncated to
    /// whole seconds; negative or non-finite values are rejected.
    pub fn normalize(self) -> Result<ThumbnailRequest> {
        let capture = match self.time_stamp.map(f64::trunc) {
            None => CaptureInstant::default(),
            // -0.5 truncates to -0.0, which compares equal to zero
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                CaptureInstant::from_secs(secs as u64)
            }
            Some(secs) => {
                return Err(ThumbnailError::InvalidInput(format!(
                    "timeStamp must be non-negative, got {secs}"
                )));
            }
        };

        Ok(ThumbnailRequest {
            locator: self.url.unwrap_or_default(),
            kind: self
                .kind
                .as_deref()
                .map(SourceKind::parse_lenient)
                .unwrap_or_default(),
            capture,
            format: self
                .format
                .as_deref()
                .map(OutputFormat::parse_lenient)
                .unwrap_or_default(),
        })
    }
}

impl TryFrom<RawRequest> for ThumbnailRequest {
    type Error = ThumbnailError;

    fn try_from(raw: RawRequest) -> Result<Self> {
        raw.normalize()
    }
}
