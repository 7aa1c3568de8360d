//! Per-job scratch working directories for the process backend.
//!
//! Every conversion subprocess gets a private, uniquely named directory so
//! two concurrent renders can never corrupt shared transient state. Removal
//! failures are logged and swallowed; they never block the batch.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::utils::config::PackagePaths;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Allocate a scratch directory under `base`. The name carries the pid and a
/// monotonic sequence so concurrent jobs (and concurrent batch processes)
/// never collide.
pub fn create_scratch_dir(base: &Path) -> Result<PathBuf> {
    let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = base.join(format!(
        "{}-{}-{}",
        PackagePaths::get().scratch_prefix(),
        std::process::id(),
        seq
    ));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create scratch dir {}", dir.display()))?;
    Ok(dir)
}

/// Remove one scratch directory. Failure is logged at debug and swallowed.
pub fn remove_scratch_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        log::debug!("failed to remove scratch dir {}: {}", dir.display(), e);
    }
}

/// Remove scratch directories left behind by this process, e.g. when a killed
/// renderer still held its directory open at cleanup time. Call only when no
/// conversions are in flight (the scheduler runs this between chunks).
pub fn sweep_stale_scratch(base: &Path) {
    let prefix = format!(
        "{}-{}-",
        PackagePaths::get().scratch_prefix(),
        std::process::id()
    );
    let Ok(read) = std::fs::read_dir(base) else {
        return;
    };
    let mut swept = 0usize;
    for entry in read.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) {
            remove_scratch_dir(&entry.path());
            swept += 1;
        }
    }
    if swept > 0 {
        log::debug!("swept {} stale scratch dir(s)", swept);
    }
}
