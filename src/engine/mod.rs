//! Engine module: scheduling, filtering, naming, progress, and aggregation.

pub mod arg_parser;
pub mod cli;
pub mod naming;
pub mod progress;
pub mod scheduler;
pub mod skip;
pub mod stats;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use naming::NameResolver;
pub use scheduler::{SchedulerContext, execute_job, run_scheduler};
pub use skip::{Decision, is_up_to_date, skip_decision};
pub use stats::{aggregate, failure_preview};
pub use tools::{glob_match, has_source_extension, matches_any_pattern};
