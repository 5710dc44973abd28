//! Camera snapshot panel.
//!
//! Holds the selection state, owns the live stream, and wires snapshots to the
//! uploader. Operations take `&mut self`, so start and stop never interleave.

use std::fmt::Write as _;

use crate::camera::{
    list_video_devices, selectable_options, CameraError, DeviceOption, MediaBackend, MediaStream,
    StreamConstraints, TrackInfo, VideoDevice,
};
use crate::data_uri;
use crate::snapshot::{frame_to_data_uri, SnapshotError, DEFAULT_JPEG_QUALITY};
use crate::upload::{SnapshotUploader, UploadTask};

/// Settings applied when the panel is mounted.
#[derive(Debug, Clone)]
pub struct PanelOptions {
    /// Base constraints; `device_id` becomes the initial selection
    pub constraints: StreamConstraints,
    pub jpeg_quality: u8,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// User-visible state of the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    /// Video inputs found at mount
    pub devices: Vec<VideoDevice>,
    /// `None` means the platform default camera
    pub selected_device_id: Option<String>,
    /// Latest snapshot as a JPEG data URI
    pub snapshot: Option<String>,
    /// Last camera failure shown to the user
    pub last_error: Option<String>,
}

/// What a frontend needs to draw the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub options: Vec<DeviceOption>,
    /// Value of the selected option (empty for the default camera)
    pub selected: String,
    pub camera_on: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub snapshot_enabled: bool,
    pub snapshot_visible: bool,
    pub error: Option<String>,
}

/// Result of a successful [`CameraPanel::take_snapshot`].
#[derive(Debug)]
pub struct SnapshotOutcome {
    /// The captured data URI, also stored as the panel's snapshot
    pub image: String,
    /// In-flight upload, `None` if the image could not be decoded for upload
    pub upload: Option<UploadTask>,
}

/// Camera picker with live stream control and snapshot upload.
pub struct CameraPanel<B: MediaBackend> {
    backend: B,
    uploader: SnapshotUploader,
    constraints: StreamConstraints,
    jpeg_quality: u8,
    state: PanelState,
    stream: Option<Box<dyn MediaStream>>,
}

impl<B: MediaBackend> std::fmt::Debug for CameraPanel<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraPanel")
            .field("state", &self.state)
            .field("camera_on", &self.is_camera_on())
            .finish_non_exhaustive()
    }
}

impl<B: MediaBackend> CameraPanel<B> {
    /// Create a panel with default options and enumerate devices.
    pub fn mount(backend: B, uploader: SnapshotUploader) -> Self {
        Self::mount_with(backend, uploader, PanelOptions::default())
    }

    /// Create a panel and enumerate devices once.
    ///
    /// Enumeration failure is logged and leaves the device list empty, so only
    /// the default camera can be selected.
    pub fn mount_with(backend: B, uploader: SnapshotUploader, options: PanelOptions) -> Self {
        let selected_device_id = options.constraints.device_id.clone();
        let mut panel = Self {
            backend,
            uploader,
            constraints: options.constraints,
            jpeg_quality: options.jpeg_quality,
            state: PanelState {
                selected_device_id,
                ..PanelState::default()
            },
            stream: None,
        };
        panel.refresh_devices();
        panel
    }

    /// Re-run device enumeration. Nothing calls this on hot-plug.
    pub fn refresh_devices(&mut self) {
        match list_video_devices(&self.backend) {
            Ok(devices) => {
                log::debug!("Found {} video device(s)", devices.len());
                self.state.devices = devices;
            }
            Err(e) => {
                log::error!("Error enumerating video devices: {}", e);
                self.state.devices.clear();
            }
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn devices(&self) -> &[VideoDevice] {
        &self.state.devices
    }

    /// Selector entries: "Default Camera" followed by every device.
    pub fn options(&self) -> Vec<DeviceOption> {
        selectable_options(&self.state.devices)
    }

    pub fn selected_device_id(&self) -> Option<&str> {
        self.state.selected_device_id.as_deref()
    }

    /// Select a device by id. An empty id selects the default camera.
    ///
    /// Takes effect on the next [`start_camera`](Self::start_camera).
    pub fn select_device(&mut self, device_id: &str) {
        self.state.selected_device_id = if device_id.is_empty() {
            None
        } else {
            Some(device_id.to_string())
        };
    }

    /// True iff a stream is attached.
    pub fn is_camera_on(&self) -> bool {
        self.stream.is_some()
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.state.snapshot.as_deref()
    }

    pub fn clear_snapshot(&mut self) {
        self.state.snapshot = None;
    }

    /// Whether the attached stream has delivered a frame yet.
    pub fn has_frame(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|s| s.has_frame())
    }

    /// Tracks of the attached stream, empty when off.
    pub fn active_tracks(&self) -> Vec<TrackInfo> {
        self.stream.as_ref().map(|s| s.tracks()).unwrap_or_default()
    }

    /// Constraints the next start will request.
    pub fn constraints(&self) -> StreamConstraints {
        StreamConstraints {
            device_id: self.state.selected_device_id.clone(),
            ..self.constraints.clone()
        }
    }

    /// Acquire a video stream from the selected device and attach it.
    ///
    /// Any stream already attached is stopped first. On failure the camera
    /// stays off and the error is kept in [`PanelState::last_error`].
    pub fn start_camera(&mut self) -> Result<(), CameraError> {
        self.stop_camera();

        let constraints = self.constraints();
        log::info!(
            "Starting camera {}",
            constraints.device_id.as_deref().unwrap_or("(default)")
        );

        match self.backend.acquire_stream(&constraints) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state.last_error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Error starting camera: {}", e);
                self.state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Stop every track of the attached stream and detach it.
    ///
    /// No-op when the camera is off.
    pub fn stop_camera(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::info!("Camera stopped");
        }
    }

    /// Capture the current frame and upload it.
    ///
    /// Returns `None` without side effects when the camera is off or no frame
    /// can be captured. Otherwise the image becomes the panel's snapshot and an
    /// upload task is spawned; upload failures are only logged.
    ///
    /// Outside a tokio runtime the snapshot is still stored, but no upload is
    /// started and `upload` is `None`.
    pub fn take_snapshot(&mut self) -> Option<SnapshotOutcome> {
        if !self.is_camera_on() {
            log::debug!("Snapshot ignored: camera is off");
            return None;
        }

        let image = match self.capture() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Snapshot failed: {}", e);
                return None;
            }
        };

        self.state.snapshot = Some(image.clone());

        let upload = match data_uri::decode(&image) {
            Ok(data) => match self.uploader.spawn(data) {
                Ok(task) => Some(task),
                Err(e) => {
                    log::error!("Error saving snapshot: {}", e);
                    None
                }
            },
            Err(e) => {
                log::error!("Error decoding snapshot: {}", e);
                None
            }
        };

        Some(SnapshotOutcome { image, upload })
    }

    fn capture(&self) -> Result<String, SnapshotError> {
        let frame = self
            .stream
            .as_ref()
            .and_then(|s| s.latest_frame())
            .ok_or(SnapshotError::NoFrame)?;
        frame_to_data_uri(&frame, self.jpeg_quality)
    }

    /// Control state for a frontend.
    pub fn view(&self) -> PanelView {
        let camera_on = self.is_camera_on();
        PanelView {
            options: self.options(),
            selected: self.state.selected_device_id.clone().unwrap_or_default(),
            camera_on,
            start_enabled: !camera_on,
            stop_enabled: camera_on,
            snapshot_enabled: camera_on,
            snapshot_visible: self.state.snapshot.is_some(),
            error: self.state.last_error.clone(),
        }
    }

    /// Plain-text rendering of [`view`](Self::view).
    pub fn render(&self) -> String {
        let view = self.view();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Camera: {}",
            if view.camera_on { "on" } else { "off" }
        );
        let _ = writeln!(out, "Select Camera:");
        for option in &view.options {
            let marker = if option.value == view.selected { '>' } else { ' ' };
            if option.value.is_empty() {
                let _ = writeln!(out, " {} {}", marker, option.label);
            } else {
                let _ = writeln!(out, " {} {} [{}]", marker, option.label, option.value);
            }
        }
        if let Some(snapshot) = &self.state.snapshot {
            let size = data_uri::payload(snapshot).map(|p| p.len()).unwrap_or(0);
            let _ = writeln!(out, "Snapshot: {} base64 chars", size);
        }
        if let Some(error) = &view.error {
            let _ = writeln!(out, "Error: {}", error);
        }
        let _ = write!(
            out,
            "{} {} {}",
            control("start", view.start_enabled),
            control("stop", view.stop_enabled),
            control("snap", view.snapshot_enabled)
        );
        out
    }
}

fn control(name: &str, enabled: bool) -> String {
    if enabled {
        format!("[{}]", name)
    } else {
        format!("({})", name)
    }
}

impl<B: MediaBackend> Drop for CameraPanel<B> {
    fn drop(&mut self) {
        self.stop_camera();
    }
}
