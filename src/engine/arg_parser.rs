use clap::Parser;
use std::path::PathBuf;

use crate::types::BackendKind;

/// Batch document converter with pluggable rendering backends.
#[derive(Clone, Parser)]
#[command(name = "renderbatch")]
#[command(about = "Convert every matching document under INPUT into OUTPUT.")]
pub struct Cli {
    /// Directory containing source documents.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for rendered artifacts. Created if absent.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Conversion backend style.
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Renderer executable. Default: the RENDERBATCH_RENDERER environment
    /// variable.
    #[arg(long)]
    pub backend_path: Option<PathBuf>,

    /// Maximum concurrent conversions. Default: 2 (session) or 4 (process).
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Concurrent-session ceiling for the session backend.
    #[arg(long)]
    pub session_ceiling: Option<usize>,

    /// Jobs per chunk; chunks run sequentially with a settle pause between.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Per-conversion timeout in seconds (process backend).
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,

    /// File name patterns (`*`/`?` wildcards, case-insensitive). A file is
    /// scheduled when it matches any pattern. Can specify multiple:
    /// -p pattern1 pattern2 pattern3
    #[arg(long, short = 'p', num_args = 1..)]
    pub pattern: Vec<String>,

    /// Source extensions to discover. Default: doc docx.
    #[arg(long, num_args = 1..)]
    pub source_ext: Vec<String>,

    /// Extension of rendered artifacts. Default: pdf.
    #[arg(long)]
    pub target_ext: Option<String>,

    /// Mtime tolerance window in seconds. Targets within this window of the
    /// source are considered up to date.
    #[arg(long, short = 'm')]
    pub mtime_window: Option<u64>,

    /// TOML file mapping numeric code pairs to descriptive output names.
    #[arg(long)]
    pub names: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}
