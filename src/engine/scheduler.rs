//! Chunked worker pool: bounded-parallel execution of conversion jobs.
//!
//! Jobs are partitioned into fixed-size chunks processed sequentially; within
//! a chunk, jobs flow through a bounded channel to a pool of worker threads.
//! Chunk boundaries carry no meaning beyond pacing: they bound peak resource
//! usage and give the backend a settle point between bursts.

use crossbeam_channel::bounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::backend::Render;
use crate::engine::progress::{ProgressBar, ProgressTracker, update_progress_bar};
use crate::engine::skip::{Decision, skip_decision};
use crate::types::{ConversionJob, ConversionResult};
use crate::utils::config::CHUNK_SETTLE_MS;

/// Everything a worker needs; shared read-only across the pool.
pub struct SchedulerContext {
    pub backend: Arc<dyn Render>,
    pub mtime_window: Duration,
    pub progress: Arc<ProgressTracker>,
    pub bar: Option<ProgressBar>,
    pub cancel: Arc<AtomicBool>,
}

/// Execute all jobs in fixed-size chunks under bounded parallelism.
///
/// Every dispatched job yields exactly one result; a failing job never
/// disturbs its siblings, the chunk, or the pool. Returns only after every
/// dispatched job has completed. When cancellation is requested, chunks not
/// yet dispatched are abandoned and the in-flight chunk drains normally.
pub fn run_scheduler(
    jobs: Vec<ConversionJob>,
    parallelism: usize,
    chunk_size: usize,
    ctx: &SchedulerContext,
) -> Vec<ConversionResult> {
    let chunk_size = chunk_size.max(1);
    let total_chunks = jobs.len().div_ceil(chunk_size);
    let mut results = Vec::with_capacity(jobs.len());

    let mut chunks: Vec<Vec<ConversionJob>> = Vec::with_capacity(total_chunks);
    let mut jobs = jobs.into_iter().peekable();
    while jobs.peek().is_some() {
        chunks.push(jobs.by_ref().take(chunk_size).collect());
    }

    for (i, chunk) in chunks.into_iter().enumerate() {
        if ctx.cancel.load(Ordering::Relaxed) {
            log::warn!(
                "cancel requested; {} chunk(s) not dispatched",
                total_chunks - i
            );
            break;
        }
        log::debug!("chunk {}/{} ({} job(s))", i + 1, total_chunks, chunk.len());
        run_chunk(chunk, parallelism, ctx, &mut results);
        if i + 1 < total_chunks {
            // Let the backend reclaim transient state before the next burst.
            ctx.backend.settle();
            thread::sleep(Duration::from_millis(CHUNK_SETTLE_MS));
        }
    }
    results
}

/// Dispatch one chunk over a fresh worker pool and drain its results.
fn run_chunk(
    chunk: Vec<ConversionJob>,
    parallelism: usize,
    ctx: &SchedulerContext,
    results: &mut Vec<ConversionResult>,
) {
    let expected = chunk.len();
    let workers = parallelism.clamp(1, expected);

    let (job_tx, job_rx) = bounded::<ConversionJob>(expected);
    let (result_tx, result_rx) = bounded::<ConversionResult>(expected);
    for job in chunk {
        let _ = job_tx.send(job);
    }
    // Dropping the sender closes the channel so workers exit when drained.
    drop(job_tx);

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let backend = Arc::clone(&ctx.backend);
            let progress = Arc::clone(&ctx.progress);
            let bar = ctx.bar.clone();
            let window = ctx.mtime_window;
            thread::spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let result = execute_job(&job, backend.as_ref(), window);
                    if let Some((done, percent)) = progress.record() {
                        log::info!("progress: {}/{} ({}%)", done, progress.total(), percent);
                    }
                    if let Some(bar) = &bar {
                        update_progress_bar(bar, 1);
                    }
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();
    drop(result_tx);

    while let Ok(result) = result_rx.recv() {
        results.push(result);
    }
    for h in handles {
        let _ = h.join();
    }
}

/// Run one job to exactly one result. Failures are absorbed here: nothing
/// crosses a job boundary except the result itself.
pub fn execute_job(
    job: &ConversionJob,
    backend: &dyn Render,
    mtime_window: Duration,
) -> ConversionResult {
    match skip_decision(&job.source, &job.target, mtime_window) {
        Decision::Skip => {
            log::debug!("up to date: {}", job.target.display());
            ConversionResult::skipped(&job.source)
        }
        Decision::Convert => match backend.convert(job) {
            Ok(()) => ConversionResult::converted(&job.source),
            Err(e) => {
                log::warn!("conversion failed for {}: {}", job.source.display(), e);
                ConversionResult::failed(&job.source, e.to_string())
            }
        },
    }
}
