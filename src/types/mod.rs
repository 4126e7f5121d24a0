//! Public types for the vidthumb API.

mod format;
mod request;
mod result;

pub use format::OutputFormat;
pub use request::{CaptureInstant, RawRequest, SourceKind, ThumbnailRequest};
pub use result::{ErrorReport, ThumbnailResult, file_uri};
