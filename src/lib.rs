//! camsnap library crate.
//!
//! A camera picker that starts and stops a live stream, captures still frames
//! as JPEG data URIs, and uploads them as multipart files.

pub mod camera;
pub mod cli;
pub mod config;
pub mod data_uri;
pub mod panel;
pub mod snapshot;
pub mod upload;

pub use panel::{CameraPanel, PanelOptions, PanelState, PanelView, SnapshotOutcome};
