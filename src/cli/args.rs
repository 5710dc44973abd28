//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pick a camera, preview it, and upload snapshots
#[derive(Parser, Debug)]
#[command(name = "camsnap")]
#[command(version, about = "Camera picker with snapshot upload", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Take one snapshot and upload it
    Snap {
        /// Camera device id (from list-cameras)
        #[arg(long)]
        camera: Option<String>,

        /// Server base URL
        #[arg(long)]
        url: Option<String>,

        /// Also write the JPEG to this file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Seconds to wait for the first frame
        #[arg(long, default_value = "5")]
        timeout: u64,
    },
    /// Interactive session (default)
    Run {
        /// Camera device id (from list-cameras)
        #[arg(long)]
        camera: Option<String>,

        /// Server base URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
