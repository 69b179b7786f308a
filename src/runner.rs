//! Concurrency runner: drive a list of tasks to results.
//!
//! Every task runs on tokio's blocking pool because the format adapters do
//! synchronous file and FFI work. In parallel mode at most
//! `config.workers` tasks are in flight (`buffer_unordered`), and results
//! arrive in completion order. Sequential mode awaits each task before
//! starting the next, so results keep discovery order.
//!
//! A panic inside an adapter is caught at the `spawn_blocking` boundary and
//! reported as that file's [`FileError::WorkerPanicked`].

use crate::config::ConversionConfig;
use crate::convert::convert_task;
use crate::error::FileError;
use crate::output::{ConversionResult, ConversionTask};
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file results.
pub type ResultStream = Pin<Box<dyn Stream<Item = ConversionResult> + Send>>;

/// Run every task and collect one result per task.
///
/// Fires `on_batch_start` before the first task and `on_batch_complete`
/// after the last.
pub async fn run_tasks(tasks: Vec<ConversionTask>, config: &ConversionConfig) -> Vec<ConversionResult> {
    let total = tasks.len();
    let start = Instant::now();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let results: Vec<ConversionResult> = result_stream(tasks, config).collect().await;

    let succeeded = results.iter().filter(|r| r.succeeded).count();
    info!(
        "Batch complete: {}/{} succeeded in {}ms",
        succeeded,
        total,
        start.elapsed().as_millis()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }
    results
}

/// Build the result stream for `tasks` without awaiting it.
///
/// A single task always runs sequentially; there is nothing to overlap.
pub fn result_stream(tasks: Vec<ConversionTask>, config: &ConversionConfig) -> ResultStream {
    let parallel = config.parallel && tasks.len() > 1;
    let workers = config.workers.max(1);
    info!(
        "Converting {} file(s) {}",
        tasks.len(),
        if parallel {
            format!("on {} workers", workers)
        } else {
            "sequentially".to_string()
        }
    );

    let config = config.clone();
    let units = stream::iter(tasks).map(move |task| run_one(task, config.clone()));

    if parallel {
        Box::pin(units.buffer_unordered(workers))
    } else {
        Box::pin(units.then(|unit| unit))
    }
}

async fn run_one(task: ConversionTask, config: ConversionConfig) -> ConversionResult {
    let start = Instant::now();
    let cb = config.progress_callback.clone();
    let pdf_settings = config.pdf_settings();
    let worker_task = task.clone();

    let joined = tokio::task::spawn_blocking(move || {
        if let Some(ref cb) = cb {
            cb.on_file_start(&worker_task.source_path, worker_task.document_type);
        }
        convert_task(&worker_task, &pdf_settings)
    })
    .await;

    let result = joined.unwrap_or_else(|e| {
        ConversionResult::failure(
            &task,
            FileError::WorkerPanicked {
                detail: e.to_string(),
            },
            start.elapsed().as_millis() as u64,
        )
    });

    if let Some(ref cb) = config.progress_callback {
        cb.on_file_complete(&result);
    }
    result
}
