//! In-memory media backend shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use camsnap::camera::{
    CameraError, DeviceKind, Frame, MediaBackend, MediaDeviceInfo, MediaStream, StreamConstraints,
    TrackInfo, TrackState,
};

/// Everything the fake backend observed.
#[derive(Default)]
pub struct Recorder {
    /// Constraints of every stream request, in order
    pub requests: Vec<StreamConstraints>,
    /// Live flag of every track handed out
    pub tracks: Vec<Arc<AtomicBool>>,
}

impl Recorder {
    pub fn live_tracks(&self) -> usize {
        self.tracks
            .iter()
            .filter(|t| t.load(Ordering::SeqCst))
            .count()
    }
}

pub struct FakeBackend {
    pub devices: Result<Vec<MediaDeviceInfo>, String>,
    pub stream_error: Option<String>,
    pub frame: Option<Frame>,
    pub recorder: Arc<Mutex<Recorder>>,
}

impl FakeBackend {
    /// Backend with the given cameras and a test pattern frame.
    pub fn with_cameras(names: &[(&str, &str)]) -> Self {
        let devices = names
            .iter()
            .map(|(id, label)| MediaDeviceInfo {
                device_id: id.to_string(),
                label: label.to_string(),
                kind: DeviceKind::VideoInput,
            })
            .collect();
        Self {
            devices: Ok(devices),
            stream_error: None,
            frame: Some(test_pattern(16, 12)),
            recorder: Arc::default(),
        }
    }

    pub fn recorder(&self) -> Arc<Mutex<Recorder>> {
        Arc::clone(&self.recorder)
    }
}

impl MediaBackend for FakeBackend {
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError> {
        self.devices.clone().map_err(CameraError::QueryFailed)
    }

    fn acquire_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        let mut recorder = self.recorder.lock().unwrap();
        recorder.requests.push(constraints.clone());

        if let Some(msg) = &self.stream_error {
            return Err(CameraError::StreamFailed(msg.clone()));
        }

        let live = Arc::new(AtomicBool::new(true));
        recorder.tracks.push(Arc::clone(&live));
        Ok(Box::new(FakeStream {
            live,
            frame: self.frame.clone(),
        }))
    }
}

pub struct FakeStream {
    live: Arc<AtomicBool>,
    frame: Option<Frame>,
}

impl MediaStream for FakeStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        vec![TrackInfo {
            id: "video0".to_string(),
            label: "fake".to_string(),
            state: if self.live.load(Ordering::SeqCst) {
                TrackState::Live
            } else {
                TrackState::Ended
            },
        }]
    }

    fn latest_frame(&self) -> Option<Frame> {
        self.frame.clone()
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// RGB gradient frame.
pub fn test_pattern(width: u32, height: u32) -> Frame {
    let data = (0..width * height)
        .flat_map(|i| {
            let v = (i * 7 % 256) as u8;
            [v, v / 2, 255 - v]
        })
        .collect();
    Frame::rgb(width, height, data)
}

/// Byte-level substring search for multipart bodies.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
