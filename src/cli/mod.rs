//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, subcommand handlers, and the
//! interactive session.

mod args;
mod commands;
pub mod session;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    apply_overrides, handle_config_action, list_cameras, load_config, mount_panel,
    run_interactive, snap, CommandError,
};
