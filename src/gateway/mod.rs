//! Gateway implementations

mod builder;
mod inflight;
mod service;
pub mod worker;

pub use builder::{Vidthumb, VidthumbBuilder};
pub use service::ThumbnailService;
pub use worker::{PendingThumbnail, ThumbnailWorker, WorkerConfig};
