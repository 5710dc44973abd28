//! Camera device enumeration.

use super::backend::MediaBackend;
use super::types::{CameraError, DeviceKind, VideoDevice};

/// Label of the option that leaves the camera choice to the platform.
pub const DEFAULT_CAMERA_LABEL: &str = "Default Camera";

/// One entry of the camera selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOption {
    /// Device id, or empty for the default camera
    pub value: String,
    pub label: String,
}

/// List the video input devices the backend knows about.
///
/// Devices of other kinds are dropped. No cameras is an empty vector, not an error.
pub fn list_video_devices<B: MediaBackend + ?Sized>(
    backend: &B,
) -> Result<Vec<VideoDevice>, CameraError> {
    let devices = backend.enumerate_devices()?;

    Ok(devices
        .into_iter()
        .filter(|d| d.kind == DeviceKind::VideoInput)
        .map(VideoDevice::from)
        .collect())
}

/// Build the selector entries: the default camera first, then each device.
///
/// Devices without a label are shown as `Camera <n>` (1-based).
pub fn selectable_options(devices: &[VideoDevice]) -> Vec<DeviceOption> {
    let mut options = Vec::with_capacity(devices.len() + 1);
    options.push(DeviceOption {
        value: String::new(),
        label: DEFAULT_CAMERA_LABEL.to_string(),
    });

    options.extend(devices.iter().enumerate().map(|(i, d)| DeviceOption {
        value: d.device_id.clone(),
        label: if d.label.is_empty() {
            format!("Camera {}", i + 1)
        } else {
            d.label.clone()
        },
    }));

    options
}
