//! Batch orchestration: discover, filter, resolve names, schedule, aggregate.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::backend::create_backend;
use crate::engine::naming::NameResolver;
use crate::engine::progress::{ProgressTracker, create_progress_bar};
use crate::engine::scheduler::{SchedulerContext, run_scheduler};
use crate::engine::stats::{aggregate, log_summary};
use crate::pipeline::discover::discover_candidates;
use crate::types::{BatchOpts, ConversionJob, RunStats};

/// Run one full batch: validate config, discover candidates, build jobs,
/// schedule, aggregate, report.
///
/// Configuration and discovery failures abort before scheduling and carry no
/// statistics; per-item failures are absorbed into the returned stats.
pub fn run_batch(opts: &BatchOpts) -> Result<RunStats> {
    let started = Instant::now();
    validate(opts)?;
    let backend = create_backend(opts)?;

    let candidates = discover_candidates(opts);
    if candidates.is_empty() {
        bail!(
            "no candidate files found under {} (extensions: {})",
            opts.input_dir.display(),
            opts.source_exts.join(", ")
        );
    }
    log::info!("{} candidate file(s) to process", candidates.len());

    let resolver = NameResolver::from_file(opts.names_file.as_deref(), &opts.target_ext);
    let jobs = build_jobs(&candidates, &resolver, opts);
    let total = jobs.len();

    let requested = opts
        .max_parallelism
        .unwrap_or_else(|| opts.backend_kind.default_parallelism())
        .min(rayon::current_num_threads().max(1));
    let workers = backend.worker_ceiling(requested);
    log::debug!("running with {} worker(s)", workers);

    let cancel = cancel_flag();
    cancel.store(false, Ordering::Relaxed);

    let ctx = SchedulerContext {
        backend,
        mtime_window: opts.mtime_window(),
        progress: Arc::new(ProgressTracker::new(total)),
        bar: create_progress_bar(total, opts.no_progress),
        cancel: Arc::clone(&cancel),
    };
    let results = run_scheduler(jobs, workers, opts.chunk_size, &ctx);

    let stats = aggregate(&results, started.elapsed());
    log_summary(&stats, &results);
    if cancel.load(Ordering::Relaxed) {
        bail!(
            "batch cancelled by user; {} of {} job(s) completed",
            results.len(),
            total
        );
    }
    Ok(stats)
}

/// Run-level validation. Failures here are fatal and reported once,
/// distinctly from per-item failures.
fn validate(opts: &BatchOpts) -> Result<()> {
    if !opts.input_dir.is_dir() {
        bail!(
            "input directory does not exist: {}",
            opts.input_dir.display()
        );
    }
    std::fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("create output directory {}", opts.output_dir.display()))?;
    if opts.chunk_size == 0 {
        bail!("chunk size must be at least 1");
    }
    Ok(())
}

/// Map candidates to jobs, resolving each target name. Resolution never
/// fails; unmapped names pass through with the target extension.
fn build_jobs(
    candidates: &[PathBuf],
    resolver: &NameResolver,
    opts: &BatchOpts,
) -> Vec<ConversionJob> {
    candidates
        .iter()
        .map(|source| {
            let name = source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            ConversionJob {
                source: source.clone(),
                target: opts.output_dir.join(resolver.resolve(name)),
            }
        })
        .collect()
}

/// Process-wide cancellation flag, wired to Ctrl+C once. The handler can
/// only be installed once per process; later batches reuse the same flag,
/// which `run_batch` resets at startup.
fn cancel_flag() -> Arc<AtomicBool> {
    static FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();
    Arc::clone(FLAG.get_or_init(|| {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);
        if let Err(e) = ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::Relaxed);
        }) {
            log::debug!("Ctrl+C handler not installed: {}", e);
        }
        flag
    }))
}
