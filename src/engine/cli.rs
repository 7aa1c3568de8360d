//! CLI command handler: layer file config under CLI flags and run the batch.

use anyhow::Result;
use log::debug;

use crate::engine::arg_parser::Cli;
use crate::pipeline::run_batch;
use crate::types::BatchOpts;
use crate::utils::batch_toml::{apply_file_to_opts, load_batch_toml};
use crate::utils::setup_logging;

/// Build [`BatchOpts`] from defaults, then the optional `.renderbatch.toml`
/// in the input directory, then CLI flags (CLI wins).
fn setup_opts(cli: &Cli) -> BatchOpts {
    setup_logging(cli.verbose);
    let mut opts = BatchOpts {
        input_dir: cli.input.clone(),
        output_dir: cli.output.clone(),
        ..BatchOpts::default()
    };
    if let Some(file) = load_batch_toml(&cli.input) {
        apply_file_to_opts(file, &mut opts);
    }
    if let Some(kind) = cli.backend {
        opts.backend_kind = kind;
    }
    if let Some(ref path) = cli.backend_path {
        opts.backend_path = Some(path.clone());
    }
    if let Some(jobs) = cli.jobs {
        opts.max_parallelism = Some(jobs);
    }
    if let Some(ceiling) = cli.session_ceiling {
        opts.session_ceiling = ceiling;
    }
    if let Some(chunk) = cli.chunk_size {
        opts.chunk_size = chunk;
    }
    if let Some(timeout) = cli.timeout {
        opts.timeout_secs = timeout;
    }
    if !cli.pattern.is_empty() {
        opts.patterns = cli.pattern.clone();
    }
    if !cli.source_ext.is_empty() {
        opts.source_exts = cli.source_ext.clone();
    }
    if let Some(ref ext) = cli.target_ext {
        opts.target_ext = ext.clone();
    }
    if let Some(window) = cli.mtime_window {
        opts.mtime_window_secs = window;
    }
    if let Some(ref names) = cli.names {
        opts.names_file = Some(names.clone());
    }
    opts.verbose = opts.verbose || cli.verbose;
    opts.no_progress = cli.no_progress;
    opts
}

/// Entry point for the binary: convert everything under `cli.input`.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    debug!(
        "{} CONFIG: {:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    run_batch(&opts)?;
    Ok(())
}
