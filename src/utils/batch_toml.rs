//! Load `.renderbatch.toml` from the input directory (CLI only). Lib callers
//! inject config via [`BatchOpts`](crate::types::BatchOpts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::types::{BackendKind, BatchOpts};
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    backend: Option<String>,
    backend_path: Option<String>,
    jobs: Option<usize>,
    session_ceiling: Option<usize>,
    chunk_size: Option<usize>,
    timeout: Option<u64>,
    patterns: Option<Vec<String>>,
    source_exts: Option<Vec<String>>,
    target_ext: Option<String>,
    mtime_window: Option<u64>,
    names: Option<String>,
    verbose: Option<bool>,
}

/// Load `.renderbatch.toml` from `dir` if present. Returns None if file
/// missing or unreadable. CLI only.
pub(crate) fn load_batch_toml(dir: &Path) -> Option<BatchToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call
/// before applying CLI flags so the command line wins.
pub(crate) fn apply_file_to_opts(file: BatchToml, opts: &mut BatchOpts) {
    let sec = file.settings;
    if let Some(ref kind) = sec.backend {
        match <BackendKind as clap::ValueEnum>::from_str(kind, true) {
            Ok(k) => opts.backend_kind = k,
            Err(_) => log::warn!("unknown backend {:?} in config file; keeping default", kind),
        }
    }
    if let Some(p) = sec.backend_path {
        opts.backend_path = Some(PathBuf::from(p));
    }
    if let Some(jobs) = sec.jobs {
        opts.max_parallelism = Some(jobs);
    }
    apply_file_opt!(sec, opts, session_ceiling => session_ceiling);
    apply_file_opt!(sec, opts, chunk_size => chunk_size);
    apply_file_opt!(sec, opts, timeout => timeout_secs);
    apply_file_opt!(sec, opts, patterns => patterns);
    apply_file_opt!(sec, opts, source_exts => source_exts);
    apply_file_opt!(sec, opts, target_ext => target_ext);
    apply_file_opt!(sec, opts, mtime_window => mtime_window_secs);
    if let Some(n) = sec.names {
        opts.names_file = Some(PathBuf::from(n));
    }
    apply_file_opt!(sec, opts, verbose => verbose);
}
