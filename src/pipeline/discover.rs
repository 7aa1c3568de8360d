//! Candidate discovery: walk the input tree and keep matching source files.

use std::path::PathBuf;
use walkdir::WalkDir;

use crate::engine::tools::{has_source_extension, matches_any_pattern};
use crate::types::BatchOpts;

/// Walk `input_dir` and return files matching the configured source
/// extensions and name patterns, in a stable order. Unreadable entries are
/// logged and skipped; discovery itself never fails once the root is known
/// to exist.
pub fn discover_candidates(opts: &BatchOpts) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(&opts.input_dir) {
        match entry {
            Ok(e) if e.file_type().is_file() => {
                let path = e.into_path();
                if !has_source_extension(&path, &opts.source_exts) {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if matches_any_pattern(name, &opts.patterns) {
                    candidates.push(path);
                }
            }
            Ok(_) => {}
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                log::warn!("cannot read {}: {}", path, err);
            }
        }
    }
    candidates.sort();
    candidates
}
