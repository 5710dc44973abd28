//! Background capture thread implementation.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, Frame, Resolution, StreamConstraints};

/// Commands sent to the capture thread.
pub enum CaptureCommand {
    Stop,
}

/// What the capture thread reports once the stream is open.
#[derive(Debug, Clone)]
pub struct OpenedStream {
    pub label: String,
    pub resolution: Resolution,
    pub fps: u32,
}

/// Run the capture loop in a background thread.
///
/// The camera is opened inside the thread; the outcome of opening it is sent
/// once on `info_tx` before any frame is captured.
pub fn run_capture_loop(
    index: CameraIndex,
    constraints: StreamConstraints,
    buffer: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<OpenedStream, CameraError>>,
) {
    let mut camera = match open_camera_with_fallback(&index, &constraints) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CameraError::StreamFailed(e.to_string())));
        return;
    }

    let res = camera.resolution();
    let opened = OpenedStream {
        label: camera.info().human_name(),
        resolution: Resolution {
            width: res.width(),
            height: res.height(),
        },
        fps: camera.frame_rate(),
    };
    log::debug!(
        "Stream open on {}: {}x{} @ {} fps",
        opened.label,
        opened.resolution.width,
        opened.resolution.height,
        opened.fps
    );
    let _ = info_tx.send(Ok(opened));

    while !stop.load(Ordering::Relaxed) {
        if let Ok(CaptureCommand::Stop) = rx.try_recv() {
            break;
        }

        if let Ok(raw_frame) = camera.frame() {
            // Frames that fail to decode are skipped
            if let Some(mut frame) = convert_to_rgb(&raw_frame) {
                if constraints.mirror {
                    mirror_horizontal(&mut frame);
                }

                if let Ok(mut buf) = buffer.lock() {
                    *buf = Some(frame);
                }
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    if let Err(e) = camera.stop_stream() {
        log::warn!("Failed to stop camera stream cleanly: {}", e);
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    constraints: &StreamConstraints,
) -> Result<Camera, CameraError> {
    let resolution = nokhwa::utils::Resolution::new(
        constraints.resolution.width,
        constraints.resolution.height,
    );

    // NV12 (native on macOS), then MJPEG, then whatever the camera offers
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::NV12,
            constraints.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::MJPEG,
            constraints.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => last_error = Some(e),
        }
    }

    let msg = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no format accepted".to_string());
    Err(classify_open_error(&msg))
}

/// Map a backend error message onto a [`CameraError`].
pub(crate) fn classify_open_error(msg: &str) -> CameraError {
    let lower = msg.to_lowercase();
    if lower.contains("permission")
        || lower.contains("denied")
        || lower.contains("authorization")
        || lower.contains("access")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::OpenFailed(msg.to_string())
    }
}
