//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    scratch_prefix: String,
    renderer_env: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                scratch_prefix: format!("{pkg}-scratch"),
                renderer_env: format!("{}_RENDERER", pkg.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Name of the optional per-directory config file (`.renderbatch.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Prefix for per-job scratch working directories.
    pub fn scratch_prefix(&self) -> &str {
        &self.scratch_prefix
    }

    /// Environment variable consulted when no renderer path is configured.
    pub fn renderer_env(&self) -> &str {
        &self.renderer_env
    }
}

// ---- Worker pool ----

/// Worker-count defaults and the session ceiling.
pub struct WorkerLimits;

impl WorkerLimits {
    /// Hard cap on concurrent sessions. The session resource is unstable
    /// under high fan-out; the cap is an empirical constant, overridable
    /// with `--session-ceiling`.
    pub const SESSION_CEILING: usize = 4;
    /// Default worker count for the session backend.
    pub const SESSION_DEFAULT: usize = 2;
    /// Default worker count for the process backend.
    pub const PROCESS_DEFAULT: usize = 4;
}

// ---- Chunking / pacing ----

/// Default number of jobs per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Pause between chunks, after the backend settle hook has run. Gives an
/// unstable session resource time to wind down before the next burst.
pub const CHUNK_SETTLE_MS: u64 = 250;

// ---- Progress ----

/// Progress reporting tuning.
pub struct ProgressConsts;

impl ProgressConsts {
    /// Emit a progress line every this many percent of total jobs.
    pub const STEP_PERCENT: usize = 5;
}

// ---- Timeouts ----

/// Default per-conversion timeout for the process backend (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Poll interval while waiting on a renderer child process (milliseconds).
pub const CHILD_POLL_MS: u64 = 50;

/// Grace period for a session renderer to exit after QUIT before it is
/// killed (milliseconds).
pub const SESSION_QUIT_GRACE_MS: u64 = 2_000;

// ---- Reporting ----

/// Failures listed in the summary before collapsing to an "and K more" line.
pub const FAILURE_PREVIEW_LIMIT: usize = 10;

// ---- Discovery defaults ----

/// Source extensions discovered when none are configured.
pub const DEFAULT_SOURCE_EXTS: &[&str] = &["doc", "docx"];

/// Extension given to rendered artifacts when none is configured.
pub const DEFAULT_TARGET_EXT: &str = "pdf";
