//! Renderbatch: batch document conversion with pluggable rendering backends

pub mod backend;
pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

/// Result alias used by public renderbatch API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: convert every matching document under
/// `opts.input_dir` into `opts.output_dir` and return the run statistics.
///
/// Fatal configuration or discovery problems (missing input dir, zero
/// candidates, unresolvable renderer) come back as errors with no
/// statistics; per-item conversion failures are counted in the returned
/// [`RunStats`] instead.
pub fn convert_dir(opts: &BatchOpts) -> Result<RunStats> {
    log::debug!(
        "{} CONFIG: {:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::run_batch(opts)
}
