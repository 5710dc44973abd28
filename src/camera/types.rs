//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

/// Kind of a media device reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Raw enumeration entry, before filtering to video inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    /// Backend-specific identifier used to request a stream
    pub device_id: String,
    /// Human-readable name (may be empty when the platform hides it)
    pub label: String,
    pub kind: DeviceKind,
}

/// A selectable camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    pub device_id: String,
    pub label: String,
}

impl From<MediaDeviceInfo> for VideoDevice {
    fn from(info: MediaDeviceInfo) -> Self {
        Self {
            device_id: info.device_id,
            label: info.label,
        }
    }
}

impl fmt::Display for VideoDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.device_id, self.label)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, the preview size of the panel
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

/// Which way the requested camera should face when no device is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Front-facing (selfie) camera
    #[default]
    User,
    /// Rear camera
    Environment,
}

/// Constraints passed to the backend when acquiring a stream.
///
/// Streams are always video-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Pinned device, or `None` for the platform default
    pub device_id: Option<String>,
    pub facing_mode: FacingMode,
    pub resolution: Resolution,
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl StreamConstraints {
    /// Constraints for a device id; an empty id means the default camera.
    pub fn for_device(device_id: Option<&str>) -> Self {
        Self {
            device_id: device_id.filter(|id| !id.is_empty()).map(str::to_string),
            ..Self::default()
        }
    }

    /// Audio is never requested.
    pub fn audio(&self) -> bool {
        false
    }
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            device_id: None,
            facing_mode: FacingMode::User,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true,
        }
    }
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
}

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Build an RGB frame stamped with the current time.
    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        }
    }

    /// Get the number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }
}

/// Lifecycle of a single track inside a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// One media channel of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub label: String,
    pub state: TrackState,
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),

    #[error("Failed to open camera: {0}")]
    OpenFailed(String),

    #[error(
        "Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera"
    )]
    PermissionDenied,

    #[error("Camera device {0} not found. Run 'list-cameras' to see available devices")]
    DeviceNotFound(String),

    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_device_display() {
        let device = VideoDevice {
            device_id: "0".to_string(),
            label: "Test Camera".to_string(),
        };
        assert_eq!(format!("{}", device), "[0] Test Camera");
    }

    #[test]
    fn test_video_device_from_media_device_info() {
        let info = MediaDeviceInfo {
            device_id: "abc".to_string(),
            label: "USB Cam".to_string(),
            kind: DeviceKind::VideoInput,
        };
        let device = VideoDevice::from(info);
        assert_eq!(device.device_id, "abc");
        assert_eq!(device.label, "USB Cam");
    }

    #[test]
    fn test_resolution_default_is_vga() {
        assert_eq!(Resolution::default(), Resolution::VGA);
        assert_eq!(Resolution::VGA.width, 640);
        assert_eq!(Resolution::VGA.height, 480);
    }

    #[test]
    fn test_constraints_for_device() {
        let c = StreamConstraints::for_device(Some("abc123"));
        assert_eq!(c.device_id.as_deref(), Some("abc123"));
        assert!(!c.audio());
    }

    #[test]
    fn test_constraints_empty_id_means_default() {
        let c = StreamConstraints::for_device(Some(""));
        assert_eq!(c.device_id, None);
        assert_eq!(c.facing_mode, FacingMode::User);

        let c = StreamConstraints::for_device(None);
        assert_eq!(c.device_id, None);
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(
            format!("{}", CameraError::QueryFailed("test".to_string())),
            "Failed to query cameras: test"
        );
        assert_eq!(
            format!("{}", CameraError::StreamFailed("busy".to_string())),
            "Failed to start camera stream: busy"
        );
        assert!(format!("{}", CameraError::PermissionDenied).contains("permission denied"));
        assert!(format!("{}", CameraError::DeviceNotFound("7".to_string())).contains('7'));
    }

    #[test]
    fn test_frame_bytes_per_pixel() {
        let frame = Frame::rgb(2, 1, vec![0; 6]);
        assert_eq!(frame.bytes_per_pixel(), 3);
        assert_eq!(frame.format, FrameFormat::Rgb);
    }
}
