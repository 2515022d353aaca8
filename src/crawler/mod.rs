//! Crawler module for link selection and the worker loop
//!
//! This module contains the core selection logic, including:
//! - Anchor extraction from stored documents
//! - Same-domain filtering and exclusion checks
//! - Frontier submission with duplicate suppression
//! - The worker loop with idle backoff and graceful shutdown

mod backoff;
mod parser;
mod selector;
mod worker;

pub use backoff::Backoff;
pub use parser::{extract_links, parse_document};
pub use selector::{CrawlEdge, SelectionPipeline};
pub use worker::{
    spawn_worker, spawn_worker_with_shutdown, CrawlWorker, WorkerHandle, WorkerOptions,
    WorkerState,
};

use crate::config::Config;
use crate::policy::ExclusionPolicy;
use crate::storage::SqliteStorage;
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of a [`run_workers`] session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub workers: usize,
    pub failed: usize,
}

/// Runs the configured number of workers until `shutdown` is cancelled
///
/// All workers share one exclusion policy, one pipeline, and the storage.
/// A worker that dies from a fatal error does not take the others down; its
/// error is logged and counted when the session ends. The session also ends
/// early if every worker has stopped on its own.
///
/// # Arguments
///
/// * `config` - The selector configuration
/// * `storage` - Shared frontier and document store
/// * `shutdown` - Cancelled to stop every worker
pub async fn run_workers(
    config: &Config,
    storage: Arc<SqliteStorage>,
    shutdown: CancellationToken,
) -> Result<RunSummary> {
    let policy = ExclusionPolicy::from_config(config);
    tracing::info!("Exclusion rules loaded for {} domain suffixes", policy.len());

    let pipeline = Arc::new(SelectionPipeline::new(policy, storage.clone()));
    let options = WorkerOptions::from_config(&config.worker);

    let handles: Vec<WorkerHandle> = (0..config.worker.workers)
        .map(|id| {
            let worker = CrawlWorker::new(
                id,
                storage.clone(),
                storage.clone(),
                pipeline.clone(),
                options.clone(),
            );
            spawn_worker_with_shutdown(worker, true, &shutdown)
        })
        .collect();

    tracing::info!("Started {} workers", handles.len());

    tokio::select! {
        _ = shutdown.cancelled() => {
            tracing::info!("Shutdown requested, stopping {} workers", handles.len());
        }
        _ = wait_all_stopped(&handles) => {
            tracing::warn!("All workers stopped on their own");
        }
    }

    let workers = handles.len();
    let mut failed = 0;
    for handle in handles {
        let id = handle.id();
        if let Err(e) = handle.graceful_terminate().await {
            tracing::error!("Worker {} ended with error: {}", id, e);
            failed += 1;
        }
    }

    tracing::info!("All workers stopped ({} failed)", failed);
    Ok(RunSummary { workers, failed })
}

async fn wait_all_stopped(handles: &[WorkerHandle]) {
    for handle in handles {
        handle.wait_stopped().await;
    }
}
