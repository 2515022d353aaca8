//! Crawl worker loop
//!
//! A worker repeatedly claims the next unprocessed URL within the depth
//! limit, runs link selection on the stored document, and marks the URL
//! processed. When the frontier is empty it waits with exponential backoff.
//! Each worker runs as its own tokio task and is stopped cooperatively
//! through a [`CancellationToken`]; the stop flag is checked once per
//! iteration and raced against every idle sleep.

use crate::config::WorkerConfig;
use crate::crawler::backoff::Backoff;
use crate::crawler::selector::{CrawlEdge, SelectionPipeline};
use crate::storage::{DocumentStore, Frontier};
use crate::{Result, SelectorError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Observable worker lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Processing, or about to poll the frontier
    Running,
    /// Frontier was empty; sleeping before the next poll
    Waiting,
    /// Loop exited; terminal
    Stopped,
}

/// Per-worker settings
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Deepest URL the worker will claim (-1 means unbounded)
    pub max_depth: i64,
    pub backoff: Backoff,
}

impl WorkerOptions {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            backoff: Backoff::from_config(config),
        }
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            max_depth: -1,
            backoff: Backoff::default(),
        }
    }
}

/// Drains the frontier, one URL at a time
pub struct CrawlWorker {
    id: usize,
    frontier: Arc<dyn Frontier>,
    documents: Arc<dyn DocumentStore>,
    pipeline: Arc<SelectionPipeline>,
    max_depth: i64,
    backoff: Backoff,
    state: watch::Sender<WorkerState>,
    processed: u64,
}

impl CrawlWorker {
    pub fn new(
        id: usize,
        frontier: Arc<dyn Frontier>,
        documents: Arc<dyn DocumentStore>,
        pipeline: Arc<SelectionPipeline>,
        options: WorkerOptions,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Running);
        Self {
            id,
            frontier,
            documents,
            pipeline,
            max_depth: options.max_depth,
            backoff: options.backoff,
            state,
            processed: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Number of documents processed so far
    pub fn processed_count(&self) -> u64 {
        self.processed
    }

    fn set_state(&self, state: WorkerState) {
        self.state.send_replace(state);
    }

    /// Runs the loop until `shutdown` is cancelled or a fatal error occurs
    ///
    /// The worker is `Stopped` when this returns, whatever the outcome.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!("Worker {} started (max depth {})", self.id, self.max_depth);

        let result = self.run_loop(&shutdown).await;
        self.set_state(WorkerState::Stopped);

        match &result {
            Ok(()) => tracing::info!(
                "Worker {} stopped after {} documents",
                self.id,
                self.processed
            ),
            Err(e) => tracing::error!("Worker {} failed: {}", self.id, e),
        }

        result
    }

    async fn run_loop(&mut self, shutdown: &CancellationToken) -> Result<()> {
        while !shutdown.is_cancelled() {
            let Some(url) = self.wait_for_url(shutdown).await? else {
                break;
            };
            self.process_url(&url)?;
        }
        Ok(())
    }

    /// Polls the frontier until a URL is claimed
    ///
    /// Returns `None` if shutdown was requested before a URL turned up.
    async fn wait_for_url(&mut self, shutdown: &CancellationToken) -> Result<Option<String>> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(None);
            }

            if let Some(url) = self.frontier.next_unprocessed(self.max_depth)? {
                self.backoff.reset();
                self.set_state(WorkerState::Running);
                return Ok(Some(url));
            }

            self.set_state(WorkerState::Waiting);
            let wait = self.backoff.current();
            tracing::debug!("Worker {} found no work, waiting {:?}", self.id, wait);

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(None),
                _ = tokio::time::sleep(wait) => {}
            }

            self.backoff.advance();
        }
    }

    /// Selects links from the stored document for `url`, then marks it processed
    ///
    /// A missing document is fatal: the URL stays claimed and the error is
    /// returned without marking it.
    pub fn process_url(&mut self, url: &str) -> Result<HashSet<CrawlEdge>> {
        tracing::info!("Processing {}", url);

        let markup = self
            .documents
            .find_by_url(url)?
            .ok_or_else(|| SelectorError::MissingDocument {
                url: url.to_string(),
            })?;

        let edges = self.pipeline.select_markup(&markup, url)?;
        self.frontier.mark_processed(url)?;
        self.processed += 1;

        Ok(edges)
    }
}

/// Handle to a worker running on its own task
pub struct WorkerHandle {
    id: usize,
    shutdown: CancellationToken,
    start: Option<oneshot::Sender<()>>,
    state: watch::Receiver<WorkerState>,
    task: JoinHandle<Result<()>>,
}

/// Spawns a worker with its own shutdown token
///
/// With `start_immediately = false` the worker sits in `Waiting` until
/// [`WorkerHandle::start`] is called.
pub fn spawn_worker(worker: CrawlWorker, start_immediately: bool) -> WorkerHandle {
    spawn_worker_with_shutdown(worker, start_immediately, &CancellationToken::new())
}

/// Spawns a worker that also stops when `parent` is cancelled
pub fn spawn_worker_with_shutdown(
    mut worker: CrawlWorker,
    start_immediately: bool,
    parent: &CancellationToken,
) -> WorkerHandle {
    let id = worker.id();
    let shutdown = parent.child_token();
    let state = worker.subscribe();

    let (start, start_rx) = if start_immediately {
        (None, None)
    } else {
        let (tx, rx) = oneshot::channel();
        worker.set_state(WorkerState::Waiting);
        (Some(tx), Some(rx))
    };

    let token = shutdown.clone();
    let task = tokio::spawn(async move {
        if let Some(start_rx) = start_rx {
            let started = tokio::select! {
                _ = token.cancelled() => false,
                res = start_rx => res.is_ok(),
            };
            if !started {
                worker.set_state(WorkerState::Stopped);
                return Ok(());
            }
        }
        worker.run(token).await
    });

    WorkerHandle {
        id,
        shutdown,
        start,
        state,
        task,
    }
}

impl WorkerHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == WorkerState::Stopped
    }

    /// Starts a worker spawned idle; returns false if it was already started
    pub fn start(&mut self) -> bool {
        match self.start.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Asks the worker to stop without waiting for it
    pub fn request_stop(&self) {
        self.shutdown.cancel();
    }

    /// Resolves once the worker reports `Stopped` (or its task is gone)
    pub async fn wait_stopped(&self) {
        let mut rx = self.state.clone();
        loop {
            if *rx.borrow_and_update() == WorkerState::Stopped {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Stops the worker and waits until it has fully exited
    ///
    /// Any document in flight finishes first. Returns the worker's own error
    /// if it had already died from a fatal failure.
    pub async fn graceful_terminate(self) -> Result<()> {
        self.shutdown.cancel();
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Worker {} task failed: {}", self.id, e);
                Err(SelectorError::WorkerPanicked { worker_id: self.id })
            }
        }
    }
}
