//! Interactive line-driven panel session.

use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use crate::camera::MediaBackend;
use crate::panel::CameraPanel;

const HELP: &str = "\
Commands:
  devices              list cameras
  select <id|default>  choose a camera for the next start
  start                start the camera
  stop                 stop the camera
  snap                 take a snapshot and upload it
  status               show the panel
  help                 show this help
  quit                 stop the camera and exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Devices,
    Select(String),
    Start,
    Stop,
    Snap,
    Status,
    Help,
    Quit,
}

/// Parse an input line.
///
/// `select default` and a bare `select` both pick the default camera.
pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = words.collect();

    let cmd = match command.as_str() {
        "devices" | "ls" => SessionCommand::Devices,
        "select" | "use" => match rest.as_slice() {
            [] | ["default"] => SessionCommand::Select(String::new()),
            [id] => SessionCommand::Select((*id).to_string()),
            _ => return Err("usage: select <id|default>".to_string()),
        },
        "start" => SessionCommand::Start,
        "stop" => SessionCommand::Stop,
        "snap" | "snapshot" => SessionCommand::Snap,
        "status" | "" => SessionCommand::Status,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(cmd)
}

/// Apply a command to the panel and return the text to show.
///
/// Disabled controls are reported, not executed, mirroring a greyed-out button.
/// Snapshot uploads are left running in the background.
pub fn execute<B: MediaBackend>(panel: &mut CameraPanel<B>, cmd: &SessionCommand) -> String {
    match cmd {
        SessionCommand::Devices => {
            panel.refresh_devices();
            let lines: Vec<String> = panel
                .options()
                .iter()
                .map(|o| {
                    if o.value.is_empty() {
                        format!("  {}", o.label)
                    } else {
                        format!("  [{}] {}", o.value, o.label)
                    }
                })
                .collect();
            lines.join("\n")
        }
        SessionCommand::Select(id) => {
            panel.select_device(id);
            match panel.selected_device_id() {
                Some(id) => format!("Selected camera {}", id),
                None => "Selected Default Camera".to_string(),
            }
        }
        SessionCommand::Start => {
            if !panel.view().start_enabled {
                return "Camera is already on".to_string();
            }
            match panel.start_camera() {
                Ok(()) => "Camera started".to_string(),
                Err(e) => format!("Error: {}", e),
            }
        }
        SessionCommand::Stop => {
            if !panel.view().stop_enabled {
                return "Camera is off".to_string();
            }
            panel.stop_camera();
            "Camera stopped".to_string()
        }
        SessionCommand::Snap => {
            if !panel.view().snapshot_enabled {
                return "Start the camera first".to_string();
            }
            match panel.take_snapshot() {
                Some(outcome) => {
                    let uploading = if outcome.upload.is_some() {
                        ", uploading"
                    } else {
                        ""
                    };
                    format!("Snapshot taken ({} chars{})", outcome.image.len(), uploading)
                }
                None => "No frame available yet".to_string(),
            }
        }
        SessionCommand::Status => panel.render(),
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => String::new(),
    }
}

/// Run the session until `quit`, end of input, or `shutdown` is notified.
///
/// The camera is stopped before returning.
pub async fn run<B: MediaBackend>(
    panel: &mut CameraPanel<B>,
    mut lines: mpsc::UnboundedReceiver<String>,
    shutdown: Arc<Notify>,
) {
    println!("{}", panel.render());
    println!("Type 'help' for commands.");

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            line = lines.recv() => {
                let Some(line) = line else { break };
                match parse_command(&line) {
                    Ok(SessionCommand::Quit) => break,
                    Ok(cmd) => println!("{}", execute(panel, &cmd)),
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    panel.stop_camera();
}

/// Read stdin lines on a dedicated thread.
///
/// A blocking stdin read must not sit on the runtime, or shutdown would wait for it.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
