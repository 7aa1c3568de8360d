pub mod batch_toml;
pub mod config;
pub mod logger;
pub mod scratch;

pub use config::*;
pub use logger::setup_logging;
pub use scratch::{create_scratch_dir, remove_scratch_dir, sweep_stale_scratch};
