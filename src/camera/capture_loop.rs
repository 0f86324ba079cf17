//! Background capture thread.
//!
//! The thread owns the nokhwa camera for its whole lifetime; the handle
//! in [`super::session`] only talks to it through the stop flag, the
//! command channel and the shared frame slot.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Commands sent to the capture thread.
pub enum StreamCommand {
    Stop,
}

/// How long the loop waits on the command channel between frames.
const COMMAND_POLL: Duration = Duration::from_millis(1);

/// Body of the capture thread.
///
/// Opens the camera, reports the negotiated format on `info_tx` once,
/// then keeps the freshest decoded frame in `slot` until told to stop.
pub fn run_capture_loop(
    settings: CameraSettings,
    slot: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    commands: Receiver<StreamCommand>,
    info_tx: Sender<Result<(Resolution, u32), CameraError>>,
) {
    let mut camera = match open_stream(&settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    let negotiated = camera.resolution();
    let _ = info_tx.send(Ok((
        Resolution {
            width: negotiated.width(),
            height: negotiated.height(),
        },
        camera.frame_rate(),
    )));

    while !stop.load(Ordering::Relaxed) {
        match commands.recv_timeout(COMMAND_POLL) {
            Ok(StreamCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // A frame that fails to decode is skipped; the next one replaces it
        if let Ok(raw) = camera.frame() {
            if let Some(mut frame) = convert_to_rgb(&raw) {
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                if let Ok(mut latest) = slot.lock() {
                    *latest = Some(frame);
                }
            }
        }
    }

    let _ = camera.stop_stream();
}

/// Open the device and start streaming, trying formats in order of
/// preference: NV12 (native on macOS), then MJPEG (widely supported),
/// then whatever the camera offers at its highest resolution.
fn open_stream(settings: &CameraSettings) -> Result<Camera, CameraError> {
    let index = CameraIndex::Index(settings.device_index);
    let attempts = [
        closest_format(settings, NokhwaFrameFormat::NV12),
        closest_format(settings, NokhwaFrameFormat::MJPEG),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;
    for requested in attempts {
        match Camera::new(index.clone(), requested) {
            Ok(mut cam) => {
                return match cam.open_stream() {
                    Ok(()) => Ok(cam),
                    Err(e) => Err(CameraError::StreamFailed(e.to_string())),
                };
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(classify_open_error(e)),
        None => Err(CameraError::OpenFailed("no formats to try".to_string())),
    }
}

fn closest_format(settings: &CameraSettings, format: NokhwaFrameFormat) -> RequestedFormat<'_> {
    RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height),
        format,
        settings.fps,
    )))
}

/// nokhwa reports OS permission failures as opaque backend errors, so
/// the distinction has to come from the message text.
fn classify_open_error(e: nokhwa::NokhwaError) -> CameraError {
    let msg = e.to_string().to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::OpenFailed(e.to_string())
    }
}
