//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use super::args::ConfigAction;
use super::session;
use crate::camera::{self, MediaBackend, NativeBackend};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TOML};
use crate::data_uri;
use crate::panel::{CameraPanel, PanelOptions};
use crate::upload::SnapshotUploader;

pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Interval between checks for the first frame.
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Load config: an explicit path must exist, the default path may be missing.
///
/// `CAMSNAP_URL` is applied on top of the file.
pub fn load_config(path: Option<&Path>) -> Result<Config, CommandError> {
    let mut cfg = match path {
        Some(path) => Config::load_from_explicit(path)?,
        None => match Config::load(None) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using default settings.", e);
                Config::default()
            }
        },
    };
    cfg.apply_env();
    Ok(cfg)
}

/// Merge CLI overrides into the config (CLI > env > file > defaults).
pub fn apply_overrides(cfg: &mut Config, camera: Option<String>, url: Option<String>) {
    if let Some(camera) = camera {
        cfg.camera.device = Some(camera);
    }
    if let Some(url) = url {
        cfg.upload.base_url = url;
    }
}

/// Mount a panel for the given config.
pub fn mount_panel<B: MediaBackend>(
    backend: B,
    cfg: &Config,
) -> Result<CameraPanel<B>, CommandError> {
    let uploader = SnapshotUploader::with_settings(cfg.upload_settings())?;
    let options = PanelOptions {
        constraints: cfg.stream_constraints(),
        jpeg_quality: cfg.camera.jpeg_quality,
    };
    Ok(CameraPanel::mount_with(backend, uploader, options))
}

/// List available cameras and print them to stdout.
pub fn list_cameras() -> Result<(), CommandError> {
    let devices = camera::list_video_devices(&NativeBackend::new())?;

    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
        println!("On macOS, grant access in System Settings > Privacy & Security > Camera.");
        return Ok(());
    }

    println!("Available cameras:");
    for option in camera::selectable_options(&devices) {
        if option.value.is_empty() {
            println!("  {}", option.label);
        } else {
            println!("  [{}] {}", option.value, option.label);
        }
    }
    println!();
    println!("Use --camera <id> to select a camera.");
    Ok(())
}

/// Start the camera, take one snapshot, wait for its upload, and stop.
pub async fn snap<B: MediaBackend>(
    panel: &mut CameraPanel<B>,
    output: Option<&Path>,
    timeout: Duration,
) -> Result<(), CommandError> {
    panel.start_camera()?;

    let deadline = Instant::now() + timeout;
    while !panel.has_frame() {
        if Instant::now() >= deadline {
            panel.stop_camera();
            return Err(format!("No frame received within {:?}", timeout).into());
        }
        tokio::time::sleep(FRAME_POLL_INTERVAL).await;
    }

    let outcome = panel.take_snapshot();
    panel.stop_camera();
    let outcome = outcome.ok_or("Failed to capture snapshot")?;

    if let Some(path) = output {
        let decoded = data_uri::decode(&outcome.image)?;
        std::fs::write(path, &decoded.bytes)?;
        println!("Wrote {} ({} bytes)", path.display(), decoded.bytes.len());
    }

    let upload = outcome.upload.ok_or("Snapshot could not be prepared for upload")?;
    let receipt = upload.wait().await?;
    println!("Snapshot uploaded ({})", receipt.status);
    Ok(())
}

/// Run the interactive session with Ctrl+C handling.
pub async fn run_interactive<B: MediaBackend>(
    panel: &mut CameraPanel<B>,
) -> Result<(), CommandError> {
    let shutdown = Arc::new(Notify::new());
    let notify = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, shutting down...");
        notify.notify_one();
    })?;

    let lines = session::spawn_stdin_reader();
    session::run(panel, lines, shutdown).await;
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<PathBuf>) -> Result<(), CommandError> {
    let config_path = path.unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let cfg = load_config(config_path.exists().then_some(config_path.as_path()))?;
            println!("Current configuration:");
            println!(
                "  Camera: {}",
                cfg.camera.device.as_deref().unwrap_or("default")
            );
            println!("  Mirror: {}", if cfg.camera.mirror { "yes" } else { "no" });
            println!(
                "  Resolution: {}x{} @ {} fps",
                cfg.camera.width, cfg.camera.height, cfg.camera.fps
            );
            println!("  JPEG quality: {}", cfg.camera.jpeg_quality);
            println!("  Upload URL: {}{}", cfg.upload.base_url, cfg.upload.endpoint);
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'camsnap config show' to view current settings.",
                    config_path.display()
                )
                .into());
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
