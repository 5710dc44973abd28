//! Tests for the snap command and the interactive session commands.

mod common;

use std::sync::Arc;
use std::time::Duration;

use camsnap::cli::session::{self, execute, parse_command, SessionCommand};
use camsnap::cli::{self, apply_overrides};
use camsnap::config::Config;
use common::FakeBackend;
use tokio::sync::{mpsc, Notify};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn panel_for(backend: FakeBackend, base_url: &str) -> camsnap::CameraPanel<FakeBackend> {
    let mut cfg = Config::default();
    apply_overrides(&mut cfg, None, Some(base_url.to_string()));
    cli::mount_panel(backend, &cfg).unwrap()
}

// === snap ===

#[tokio::test]
async fn test_snap_uploads_and_writes_output() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/camera"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    let recorder = backend.recorder();
    let mut panel = panel_for(backend, &mock_server.uri());

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("snapshot.jpg");

    cli::snap(&mut panel, Some(output.as_path()), Duration::from_secs(1))
        .await
        .unwrap();

    let jpeg = std::fs::read(&output).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert!(!panel.is_camera_on());
    assert_eq!(recorder.lock().unwrap().live_tracks(), 0);
}

#[tokio::test]
async fn test_snap_reports_upload_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/camera"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Snapshot file not found"))
        .mount(&mock_server)
        .await;

    let mut panel = panel_for(
        FakeBackend::with_cameras(&[("0", "Cam")]),
        &mock_server.uri(),
    );

    let err = cli::snap(&mut panel, None, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn test_snap_times_out_without_frames() {
    let mut backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    backend.frame = None;
    let recorder = backend.recorder();
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    let err = cli::snap(&mut panel, None, Duration::from_millis(100))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No frame received"));
    assert!(!panel.is_camera_on());
    assert_eq!(recorder.lock().unwrap().live_tracks(), 0);
}

#[tokio::test]
async fn test_snap_fails_when_camera_cannot_start() {
    let mut backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    backend.stream_error = Some("permission denied".to_string());
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    let err = cli::snap(&mut panel, None, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("permission denied"));
}

// === session ===

#[test]
fn test_session_start_stop_cycle() {
    let backend = FakeBackend::with_cameras(&[("abc123", "USB Camera")]);
    let recorder = backend.recorder();
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    let out = execute(&mut panel, &parse_command("select abc123").unwrap());
    assert_eq!(out, "Selected camera abc123");

    assert_eq!(execute(&mut panel, &SessionCommand::Start), "Camera started");
    // Start is disabled while on
    assert_eq!(
        execute(&mut panel, &SessionCommand::Start),
        "Camera is already on"
    );
    assert_eq!(execute(&mut panel, &SessionCommand::Stop), "Camera stopped");
    assert_eq!(execute(&mut panel, &SessionCommand::Stop), "Camera is off");

    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.requests.len(), 1);
    assert_eq!(recorder.requests[0].device_id.as_deref(), Some("abc123"));
}

#[test]
fn test_session_snap_requires_camera() {
    let mut panel = panel_for(
        FakeBackend::with_cameras(&[("0", "Cam")]),
        "http://127.0.0.1:9",
    );
    assert_eq!(
        execute(&mut panel, &SessionCommand::Snap),
        "Start the camera first"
    );
}

#[tokio::test]
async fn test_session_snap_takes_snapshot() {
    let mut panel = panel_for(
        FakeBackend::with_cameras(&[("0", "Cam")]),
        "http://127.0.0.1:9",
    );
    execute(&mut panel, &SessionCommand::Start);

    let out = execute(&mut panel, &SessionCommand::Snap);
    assert!(out.starts_with("Snapshot taken"));
    assert!(out.contains("uploading"));
    assert!(panel.snapshot().is_some());
}

#[test]
fn test_session_devices_lists_default_first() {
    let mut panel = panel_for(
        FakeBackend::with_cameras(&[("0", "Front"), ("1", "Back")]),
        "http://127.0.0.1:9",
    );
    let out = execute(&mut panel, &SessionCommand::Devices);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, vec!["  Default Camera", "  [0] Front", "  [1] Back"]);
}

#[test]
fn test_session_start_failure_shows_error() {
    let mut backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    backend.stream_error = Some("busy".to_string());
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    let out = execute(&mut panel, &SessionCommand::Start);
    assert_eq!(out, "Error: Failed to start camera stream: busy");
    assert!(panel.render().contains("Error: Failed to start camera stream: busy"));
}

// === session loop ===

fn feed(lines: &[&str]) -> (mpsc::UnboundedSender<String>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    for line in lines {
        tx.send(line.to_string()).unwrap();
    }
    (tx, rx)
}

#[tokio::test]
async fn test_session_quit_releases_camera() {
    let backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    let recorder = backend.recorder();
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    // Sender stays open, so only `quit` can end the loop
    let (_tx, rx) = feed(&["start", "quit"]);
    tokio::time::timeout(
        Duration::from_secs(5),
        session::run(&mut panel, rx, Arc::new(Notify::new())),
    )
    .await
    .expect("session should end on quit");

    assert!(!panel.is_camera_on());
    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.tracks.len(), 1);
    assert_eq!(recorder.live_tracks(), 0);
}

#[tokio::test]
async fn test_session_end_of_input_releases_camera() {
    let backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    let recorder = backend.recorder();
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    let (tx, rx) = feed(&["start"]);
    drop(tx);
    tokio::time::timeout(
        Duration::from_secs(5),
        session::run(&mut panel, rx, Arc::new(Notify::new())),
    )
    .await
    .expect("session should end when input closes");

    assert!(!panel.is_camera_on());
    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.tracks.len(), 1);
    assert_eq!(recorder.live_tracks(), 0);
}

#[tokio::test]
async fn test_session_shutdown_releases_camera() {
    let backend = FakeBackend::with_cameras(&[("0", "Cam")]);
    let recorder = backend.recorder();
    let mut panel = panel_for(backend, "http://127.0.0.1:9");

    let (_tx, rx) = feed(&["start"]);
    let shutdown = Arc::new(Notify::new());
    let trigger = Arc::clone(&shutdown);

    let session = session::run(&mut panel, rx, shutdown);
    let ctrl_c = async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.notify_one();
    };
    tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(session, ctrl_c);
    })
    .await
    .expect("session should end on shutdown");

    assert!(!panel.is_camera_on());
    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.tracks.len(), 1);
    assert_eq!(recorder.live_tracks(), 0);
}
