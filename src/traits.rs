//! Core ThumbnailGateway trait

use std::path::Path;

use async_trait::async_trait;

use crate::{RawRequest, Result, ThumbnailRequest, ThumbnailResult};

/// The host-facing entry point.
///
/// Implemented by [`ThumbnailService`](crate::ThumbnailService) (runs the
/// request on the caller's task, offloading blocking work) and by
/// [`ThumbnailWorker`](crate::ThumbnailWorker) (queues the request onto a
/// background worker). Results come back through the returned future; the
/// gateway never holds on to the caller's context.
#[async_trait]
pub trait ThumbnailGateway: Send + Sync {
    /// Produce (or reuse) the thumbnail for a normalized request.
    async fn create(&self, request: ThumbnailRequest) -> Result<ThumbnailResult>;

    /// Directory the gateway caches into.
    fn cache_root(&self) -> &Path;

    /// Normalize a host request, then [`create`](Self::create) it.
    async fn create_raw(&self, raw: RawRequest) -> Result<ThumbnailResult> {
        self.create(raw.normalize()?).await
    }

    /// Parse a JSON host request, then [`create`](Self::create) it.
    async fn create_json(&self, json: &str) -> Result<ThumbnailResult> {
        self.create(ThumbnailRequest::from_json(json)?).await
    }
}
