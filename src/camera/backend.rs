//! Platform media seam.
//!
//! The panel only talks to cameras through these two traits, so the native
//! `nokhwa` backend and in-memory test doubles are interchangeable.

use super::types::{CameraError, Frame, MediaDeviceInfo, StreamConstraints, TrackInfo};

/// Access to the platform's media devices.
pub trait MediaBackend {
    /// List every connected media device, of any kind.
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError>;

    /// Acquire a live video stream matching `constraints`.
    fn acquire_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// A live stream exclusively owned by whoever acquired it.
///
/// Hardware stays busy until [`MediaStream::stop`] has ended every track.
pub trait MediaStream {
    /// Tracks in this stream and their current state.
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Latest frame delivered by the video track, if any arrived yet.
    fn latest_frame(&self) -> Option<Frame>;

    /// Whether a frame has arrived. Backends holding frames behind a lock
    /// should override this to avoid copying the pixels.
    fn has_frame(&self) -> bool {
        self.latest_frame().is_some()
    }

    /// Stop every track. Calling it again is a no-op.
    fn stop(&mut self);
}

impl<B: MediaBackend + ?Sized> MediaBackend for Box<B> {
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError> {
        (**self).enumerate_devices()
    }

    fn acquire_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        (**self).acquire_stream(constraints)
    }
}
