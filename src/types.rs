//! Public and internal types for the renderbatch API and pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_SOURCE_EXTS, DEFAULT_TARGET_EXT, DEFAULT_TIMEOUT_SECS,
    WorkerLimits,
};

/// One unit of work: render `source` into `target`.
/// Immutable once built; owned by the worker that processes it and discarded
/// after producing a [`ConversionResult`].
#[derive(Clone, Debug)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Outcome of one job. Exactly one is produced per submitted job.
/// `skipped` implies `success`; the constructors keep that invariant.
#[derive(Clone, Debug)]
pub struct ConversionResult {
    pub path: PathBuf,
    pub success: bool,
    pub skipped: bool,
    pub error: Option<String>,
}

impl ConversionResult {
    /// The backend produced the target artifact.
    pub fn converted(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: true,
            skipped: false,
            error: None,
        }
    }

    /// The target was already up to date; the backend was never invoked.
    pub fn skipped(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: true,
            skipped: true,
            error: None,
        }
    }

    /// The conversion failed; `cause` is the human-readable reason.
    pub fn failed(path: &Path, cause: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            skipped: false,
            error: Some(cause.into()),
        }
    }
}

/// Backend style, selected once per run from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// Stateful exclusive render session per job (serve-mode renderer).
    Session,
    /// Isolated renderer subprocess per job.
    Process,
}

impl BackendKind {
    /// Default worker count when `--jobs` is not given.
    pub fn default_parallelism(&self) -> usize {
        match self {
            BackendKind::Session => WorkerLimits::SESSION_DEFAULT,
            BackendKind::Process => WorkerLimits::PROCESS_DEFAULT,
        }
    }
}

/// Full batch options (CLI and lib). Read-only for the duration of a run.
#[derive(Clone, Debug)]
pub struct BatchOpts {
    /// Directory containing source documents.
    pub input_dir: PathBuf,
    /// Directory for rendered artifacts. Created if absent.
    pub output_dir: PathBuf,
    /// Which backend style performs the conversions.
    pub backend_kind: BackendKind,
    /// Renderer executable. When None, discovered from the environment.
    pub backend_path: Option<PathBuf>,
    /// Requested worker count. When None, derived from the backend kind.
    /// The backend may clamp it further (session ceiling).
    pub max_parallelism: Option<usize>,
    /// Hard cap on concurrent sessions for the session backend.
    pub session_ceiling: usize,
    /// Jobs per chunk; chunks run sequentially with a settle pause between.
    pub chunk_size: usize,
    /// Per-conversion timeout in seconds (process backend only).
    pub timeout_secs: u64,
    /// File name patterns (`*`/`?` wildcards, case-insensitive, whole-name).
    /// A file is scheduled when it matches any pattern; empty means all.
    pub patterns: Vec<String>,
    /// Source extensions considered during discovery.
    pub source_exts: Vec<String>,
    /// Extension of rendered artifacts.
    pub target_ext: String,
    /// Mtime tolerance window in seconds for the skip check.
    pub mtime_window_secs: u64,
    /// Optional TOML file mapping numeric code pairs to output names.
    pub names_file: Option<PathBuf>,
    /// Verbose output.
    pub verbose: bool,
    /// Disable the progress bar.
    pub no_progress: bool,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            backend_kind: BackendKind::Process,
            backend_path: None,
            max_parallelism: None,
            session_ceiling: WorkerLimits::SESSION_CEILING,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            patterns: Vec::new(),
            source_exts: DEFAULT_SOURCE_EXTS.iter().map(|s| s.to_string()).collect(),
            target_ext: DEFAULT_TARGET_EXT.to_string(),
            mtime_window_secs: 0,
            names_file: None,
            verbose: false,
            no_progress: false,
        }
    }
}

impl BatchOpts {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn mtime_window(&self) -> Duration {
        Duration::from_secs(self.mtime_window_secs)
    }
}

/// Aggregate outcome of one batch run. Derived once from the full result
/// sequence after all workers have joined; never mutated concurrently.
#[derive(Clone, Debug, Default)]
pub struct RunStats {
    /// Jobs the backend actually converted.
    pub converted: usize,
    /// Jobs skipped because the target was already up to date.
    pub skipped: usize,
    /// Jobs that failed (timeouts included).
    pub failed: usize,
    pub elapsed: Duration,
    /// Jobs per second over the whole run (0.0 for an instantaneous run).
    pub throughput: f64,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }
}
