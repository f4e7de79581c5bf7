//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;

pub use commands::{ConfigSubcommand, handle_config_command, handle_hierarchy, handle_publish};
pub use logging::init_logging;
