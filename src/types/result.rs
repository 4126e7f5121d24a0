//! Results reported back to the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ThumbnailError;

/// A cached thumbnail ready for use.
///
/// Serializes to the host wire format `{ path, width, height }`, where
/// `path` is a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailResult {
    pub path: String,
    /// Local filesystem path of the cache entry.
    #[serde(skip)]
    pub file: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailResult {
    pub(crate) fn new(file: PathBuf, width: u32, height: u32) -> Self {
        Self {
            path: file_uri(&file),
            file,
            width,
            height,
        }
    }
}

/// Render a local path as a `file://` URI.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Single failure signal handed to a host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
}

impl From<&ThumbnailError> for ErrorReport {
    fn from(err: &ThumbnailError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_to_wire_format() {
        let result = ThumbnailResult::new(PathBuf::from("/cache/thumbnails/thumb-x.jpeg"), 640, 360);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["path"], "file:///cache/thumbnails/thumb-x.jpeg");
        assert_eq!(json["width"], 640);
        assert_eq!(json["height"], 360);
        assert!(json.get("file").is_none());
    }

    #[test]
    fn error_report_carries_code() {
        let report = ErrorReport::from(&ThumbnailError::Decode("no frame".into()));
        assert_eq!(report.code, "CreateThumbnail_ERROR");
        assert!(report.message.contains("no frame"));
    }
}
