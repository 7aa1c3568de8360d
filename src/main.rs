//! Renderbatch CLI: batch-convert a directory of documents with an external
//! renderer.

use anyhow::Result;
use clap::Parser;
use renderbatch::engine::arg_parser::Cli;
use renderbatch::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
