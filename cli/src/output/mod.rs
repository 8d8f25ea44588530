//! CLI-specific output implementations
//!
//! Terminal progress reporting for the agent loop and coloured rendering of
//! finished runs.

pub mod cli_handler;
pub mod display;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
pub use display::print_run;
