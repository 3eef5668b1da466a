pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::{run, set_log_level, setup_logging, LogHandle};
