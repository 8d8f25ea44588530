//! CLI command implementations

pub mod console;
pub mod run;
pub mod serve;
pub mod tools;

pub use console::console_command;
pub use run::{run_command, RunArgs};
pub use serve::{serve_command, ServeArgs};
pub use tools::tools_command;
