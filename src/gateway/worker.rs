//! Background worker fed through a bounded queue.
//!
//! Requests are sent over a bounded `tokio::sync::mpsc` channel to a single
//! spawned task, which drains it with a fixed concurrency limit. With the
//! default limit of 1 requests are handled strictly in arrival order. Each
//! job carries its own reply route (a `oneshot` sender or a caller-supplied
//! callback), so the worker never keeps a handle on the caller.
//!
//! When the queue is full, [`ThumbnailWorker::submit`] waits for room rather
//! than growing memory.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use super::ThumbnailService;
use crate::{Result, ThumbnailError, ThumbnailGateway, ThumbnailRequest, ThumbnailResult};

/// Default number of queued requests.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Worker tuning.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Requests processed at once. Default: 1.
    pub concurrency: usize,
    /// Bounded queue length. Default: [`DEFAULT_QUEUE_CAPACITY`].
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WorkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }
}

type Callback = Box<dyn FnOnce(Result<ThumbnailResult>) + Send + 'static>;

enum Reply {
    Channel(oneshot::Sender<Result<ThumbnailResult>>),
    Callback(Callback),
}

impl Reply {
    fn deliver(self, outcome: Result<ThumbnailResult>) {
        match self {
            // receiver dropped: nobody is waiting
            Reply::Channel(tx) => {
                let _ = tx.send(outcome);
            }
            Reply::Callback(callback) => callback(outcome),
        }
    }
}

struct Job {
    request: ThumbnailRequest,
    reply: Reply,
}

/// Queue-fed background worker around a [`ThumbnailService`].
pub struct ThumbnailWorker {
    tx: mpsc::Sender<Job>,
    handle: JoinHandle<()>,
    root: PathBuf,
}

impl ThumbnailWorker {
    /// Spawn the worker task.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn spawn(service: Arc<ThumbnailService>, config: WorkerConfig) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(config.queue_capacity.max(1));
        let concurrency = config.concurrency.max(1);
        let root = service.store().root().to_path_buf();

        let handle = tokio::spawn(async move {
            ReceiverStream::new(rx)
                .for_each_concurrent(concurrency, |job| {
                    let service = Arc::clone(&service);
                    async move {
                        let outcome = service.create(job.request).await;
                        job.reply.deliver(outcome);
                    }
                })
                .await;
            debug!("thumbnail worker stopped");
        });

        Self { tx, handle, root }
    }

    /// Queue a request; the returned future resolves with its outcome.
    pub async fn submit(&self, request: ThumbnailRequest) -> Result<PendingThumbnail> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(Job {
            request,
            reply: Reply::Channel(tx),
        })
        .await?;
        Ok(PendingThumbnail { rx })
    }

    /// Queue a request; `callback` runs on the worker with its outcome.
    pub async fn submit_with<F>(&self, request: ThumbnailRequest, callback: F) -> Result<()>
    where
        F: FnOnce(Result<ThumbnailResult>) + Send + 'static,
    {
        self.enqueue(Job {
            request,
            reply: Reply::Callback(Box::new(callback)),
        })
        .await
    }

    /// Stop accepting requests and wait for queued ones to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        // a panicked worker task has nothing left to flush
        let _ = self.handle.await;
    }

    async fn enqueue(&self, job: Job) -> Result<()> {
        self.tx
            .send(job)
            .await
            .map_err(|_| ThumbnailError::Worker("thumbnail worker has shut down".to_string()))
    }
}

#[async_trait]
impl ThumbnailGateway for ThumbnailWorker {
    async fn create(&self, request: ThumbnailRequest) -> Result<ThumbnailResult> {
        self.submit(request).await?.await
    }

    fn cache_root(&self) -> &Path {
        &self.root
    }
}

/// Outcome of a queued request.
#[must_use = "the request still runs, but its outcome is lost unless awaited"]
pub struct PendingThumbnail {
    rx: oneshot::Receiver<Result<ThumbnailResult>>,
}

impl Future for PendingThumbnail {
    type Output = Result<ThumbnailResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(ThumbnailError::Worker(
                    "worker dropped the request".to_string(),
                ))
            })
        })
    }
}
