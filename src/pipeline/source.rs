//! Media source resolution.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::types::SourceKind;

const FILE_SCHEME: &str = "file://";

/// A resolved input for a [`FrameDecoder`](super::FrameDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Local file.
    File(PathBuf),
    /// Network URL, opened by the decoder without extra headers.
    Url(String),
}

impl MediaSource {
    /// Interpret a locator according to its kind.
    ///
    /// Local locators lose a leading `file://`; remote locators are used
    /// verbatim.
    pub fn resolve(locator: &str, kind: SourceKind) -> Self {
        match kind {
            SourceKind::Local => {
                let path = locator.strip_prefix(FILE_SCHEME).unwrap_or(locator);
                MediaSource::File(PathBuf::from(path))
            }
            SourceKind::Remote => MediaSource::Url(locator.to_string()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Url(_))
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaSource::File(path) => Some(path),
            MediaSource::Url(_) => None,
        }
    }

    /// The input as passed on a decoder command line.
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            MediaSource::File(path) => path.as_os_str(),
            MediaSource::Url(url) => OsStr::new(url),
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::File(path) => write!(f, "{}", path.display()),
            MediaSource::Url(url) => f.write_str(url),
        }
    }
}
