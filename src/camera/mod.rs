//! Camera access for the snapshot panel.
//!
//! This module provides:
//! - The platform seam via [`MediaBackend`] and [`MediaStream`]
//! - Device enumeration via [`list_video_devices`] and [`selectable_options`]
//! - Native cameras via [`NativeBackend`]
//! - Stream configuration via [`StreamConstraints`] and [`Resolution`]

mod backend;
mod capture_loop;
mod device;
mod frame_utils;
mod native;
mod types;

pub use backend::{MediaBackend, MediaStream};
pub use device::{list_video_devices, selectable_options, DeviceOption, DEFAULT_CAMERA_LABEL};
pub use native::{camera_index, NativeBackend, NativeStream};
pub use types::{
    CameraError, DeviceKind, FacingMode, Frame, FrameFormat, MediaDeviceInfo, Resolution,
    StreamConstraints, TrackInfo, TrackState, VideoDevice,
};
