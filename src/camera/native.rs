//! Native camera backend built on nokhwa.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use nokhwa::query;
use nokhwa::utils::{ApiBackend, CameraIndex};

use super::backend::{MediaBackend, MediaStream};
use super::capture_loop::{run_capture_loop, CaptureCommand, OpenedStream};
use super::types::{
    CameraError, DeviceKind, Frame, MediaDeviceInfo, Resolution, StreamConstraints, TrackInfo,
    TrackState,
};

/// Media backend for locally attached cameras.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Map a device id onto a nokhwa camera index.
///
/// Numeric ids are indices, anything else is passed through as a string id.
/// No id selects index 0, the platform default.
pub fn camera_index(device_id: Option<&str>) -> CameraIndex {
    match device_id {
        None => CameraIndex::Index(0),
        Some(id) => id
            .parse::<u32>()
            .map(CameraIndex::Index)
            .unwrap_or_else(|_| CameraIndex::String(id.to_string())),
    }
}

impl MediaBackend for NativeBackend {
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError> {
        let devices =
            query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

        // nokhwa only reports video capture devices
        Ok(devices
            .into_iter()
            .map(|d| MediaDeviceInfo {
                device_id: d.index().to_string(),
                label: d.human_name(),
                kind: DeviceKind::VideoInput,
            })
            .collect())
    }

    fn acquire_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        let stream = NativeStream::start(constraints.clone())?;
        Ok(Box::new(stream))
    }
}

/// Live stream backed by a background capture thread.
///
/// The thread keeps the latest frame in a shared buffer. Dropping the stream
/// stops the thread and releases the camera.
pub struct NativeStream {
    frame_buffer: Arc<Mutex<Option<Frame>>>,
    capture_thread: Option<JoinHandle<()>>,
    command_tx: Option<Sender<CaptureCommand>>,
    stop_signal: Arc<AtomicBool>,
    constraints: StreamConstraints,
    opened: OpenedStream,
}

impl std::fmt::Debug for NativeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeStream")
            .field("constraints", &self.constraints)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl NativeStream {
    /// Open the camera and start capturing.
    ///
    /// Blocks until the capture thread reports that the stream is open.
    ///
    /// # Errors
    /// * `CameraError::PermissionDenied` - If camera access is denied
    /// * `CameraError::OpenFailed` - If the camera fails to open
    /// * `CameraError::StreamFailed` - If the stream fails to start
    pub fn start(constraints: StreamConstraints) -> Result<Self, CameraError> {
        let index = camera_index(constraints.device_id.as_deref());
        let frame_buffer = Arc::new(Mutex::new(None));
        let stop_signal = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let (info_tx, info_rx) = mpsc::channel::<Result<OpenedStream, CameraError>>();

        let buffer = Arc::clone(&frame_buffer);
        let stop = Arc::clone(&stop_signal);
        let thread_constraints = constraints.clone();
        let handle = std::thread::spawn(move || {
            run_capture_loop(index, thread_constraints, buffer, stop, rx, info_tx);
        });

        match info_rx.recv() {
            Ok(Ok(opened)) => Ok(Self {
                frame_buffer,
                capture_thread: Some(handle),
                command_tx: Some(tx),
                stop_signal,
                constraints,
                opened,
            }),
            Ok(Err(e)) => {
                stop_signal.store(true, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                stop_signal.store(true, Ordering::SeqCst);
                let _ = handle.join();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Resolution the camera actually delivers.
    pub fn actual_resolution(&self) -> Resolution {
        self.opened.resolution
    }

    pub fn actual_fps(&self) -> u32 {
        self.opened.fps
    }

    /// Check if the capture thread is currently running.
    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl MediaStream for NativeStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        vec![TrackInfo {
            id: "video0".to_string(),
            label: self.opened.label.clone(),
            state: if self.is_running() {
                TrackState::Live
            } else {
                TrackState::Ended
            },
        }]
    }

    fn latest_frame(&self) -> Option<Frame> {
        let buffer = self.frame_buffer.lock().ok()?;
        buffer.clone()
    }

    fn has_frame(&self) -> bool {
        self.frame_buffer
            .lock()
            .map(|buffer| buffer.is_some())
            .unwrap_or(false)
    }

    fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        // Also send stop command via channel (in case thread is blocked)
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }

        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_index_default() {
        assert_eq!(camera_index(None), CameraIndex::Index(0));
    }

    #[test]
    fn test_camera_index_numeric() {
        assert_eq!(camera_index(Some("2")), CameraIndex::Index(2));
    }

    #[test]
    fn test_camera_index_string() {
        assert_eq!(
            camera_index(Some("abc123")),
            CameraIndex::String("abc123".to_string())
        );
    }

    #[test]
    fn test_enumerate_devices_does_not_panic() {
        // May fail on machines without a camera backend; must not panic
        let _ = NativeBackend::new().enumerate_devices();
    }
}
