//! Result aggregation: counts, throughput, bounded failure preview.

use std::time::Duration;

use crate::types::{ConversionResult, RunStats};
use crate::utils::config::FAILURE_PREVIEW_LIMIT;

/// Pure fold over the full result sequence. Runs once, after all workers
/// have joined.
pub fn aggregate(results: &[ConversionResult], elapsed: Duration) -> RunStats {
    let converted = results.iter().filter(|r| r.success && !r.skipped).count();
    let skipped = results.iter().filter(|r| r.skipped).count();
    let failed = results.iter().filter(|r| !r.success).count();
    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        results.len() as f64 / secs
    } else {
        0.0
    };
    RunStats {
        converted,
        skipped,
        failed,
        elapsed,
        throughput,
    }
}

/// First `limit` failures, with an explicit "and K more" marker past the
/// bound so the report stays readable for large batches.
pub fn failure_preview(results: &[ConversionResult], limit: usize) -> Vec<String> {
    let failures: Vec<&ConversionResult> = results.iter().filter(|r| !r.success).collect();
    let mut lines: Vec<String> = failures
        .iter()
        .take(limit)
        .map(|r| {
            format!(
                "{}: {}",
                r.path.display(),
                r.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect();
    if failures.len() > limit {
        lines.push(format!("... and {} more", failures.len() - limit));
    }
    lines
}

/// Log the end-of-run summary: counts, elapsed, throughput, failure preview.
pub fn log_summary(stats: &RunStats, results: &[ConversionResult]) {
    log::info!(
        "Converted: {} | Skipped: {} | Failed: {}",
        stats.converted,
        stats.skipped,
        stats.failed
    );
    log::info!(
        "Elapsed: {:.1}s ({:.1} files/s)",
        stats.elapsed.as_secs_f64(),
        stats.throughput
    );
    if stats.failed > 0 {
        log::warn!("{} file(s) failed:", stats.failed);
        for line in failure_preview(results, FAILURE_PREVIEW_LIMIT) {
            log::warn!("  {}", line);
        }
    }
}
