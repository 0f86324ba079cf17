//! Camera session handle and public API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::capture_loop::{run_capture_loop, StreamCommand};
use super::device::list_devices;
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// A single live camera stream.
///
/// The session runs a background thread that continuously decodes frames
/// and stores the most recent one in a shared buffer. `latest_frame()`
/// returns a clone of that frame for still capture.
///
/// The stream is scoped to the session: dropping it stops the capture
/// thread and closes the stream, so the camera is always released when
/// the capture surface goes away.
pub struct CameraSession {
    /// Latest decoded frame (shared with capture thread)
    frame_buffer: Arc<Mutex<Option<Frame>>>,
    /// Capture thread handle
    capture_thread: Option<JoinHandle<()>>,
    /// Channel to send commands to capture thread
    command_tx: Option<Sender<StreamCommand>>,
    /// Signal to stop capture thread
    stop_signal: Arc<AtomicBool>,
    /// Current settings
    settings: CameraSettings,
    /// Actual resolution (set after the stream opens)
    actual_resolution: Option<Resolution>,
    /// Actual FPS (set after the stream opens)
    actual_fps: Option<u32>,
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraSession {
    /// Open a camera session with the specified settings.
    ///
    /// Validates that the device exists but does not open the stream
    /// until `start()` is called. The camera itself is opened inside the
    /// background thread to avoid thread-safety issues.
    ///
    /// # Errors
    /// * `CameraError::NoDevices` - If the system has no cameras at all
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        Ok(Self {
            frame_buffer: Arc::new(Mutex::new(None)),
            capture_thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
            actual_resolution: None,
            actual_fps: None,
        })
    }

    /// Get the current camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Actual resolution the camera is delivering, once started.
    ///
    /// May differ from the requested resolution when the camera doesn't
    /// support it exactly.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Actual frame rate the camera is delivering, once started.
    pub fn actual_fps(&self) -> Option<u32> {
        self.actual_fps
    }

    /// Start the stream in a background thread.
    ///
    /// Blocks until the thread reports whether the camera opened, so
    /// permission and device errors surface here rather than later.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If the stream is already running
    /// * `CameraError::PermissionDenied` - If camera access is denied
    /// * `CameraError::StreamFailed` / `CameraError::OpenFailed` - If the
    ///   camera fails to open or start streaming
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        let buffer = Arc::clone(&self.frame_buffer);
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();

        // Channel to receive actual resolution/fps from the thread
        let (info_tx, info_rx) = mpsc::channel::<Result<(Resolution, u32), CameraError>>();

        let handle = std::thread::spawn(move || {
            run_capture_loop(settings, buffer, stop, rx, info_tx);
        });

        self.capture_thread = Some(handle);

        match info_rx.recv() {
            Ok(Ok((res, fps))) => {
                log::info!("Camera stream opened at {}x{} @ {} fps", res.width, res.height, fps);
                self.actual_resolution = Some(res);
                self.actual_fps = Some(fps);
                Ok(())
            }
            Ok(Err(e)) => {
                self.stop_signal.store(true, Ordering::SeqCst);
                if let Some(h) = self.capture_thread.take() {
                    let _ = h.join();
                }
                Err(e)
            }
            Err(_) => {
                self.stop_signal.store(true, Ordering::SeqCst);
                if let Some(h) = self.capture_thread.take() {
                    let _ = h.join();
                }
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Stop the capture thread and close the stream.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        // Also send a stop command in case the thread is blocked
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(StreamCommand::Stop);
        }

        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }

    /// The most recent frame off the stream, if any has landed yet.
    pub fn latest_frame(&self) -> Option<Frame> {
        let buffer = self.frame_buffer.lock().ok()?;
        buffer.clone()
    }

    /// Whether the capture thread is currently running.
    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_invalid_device() {
        let settings = CameraSettings {
            device_index: 999,
            ..CameraSettings::default()
        };
        let result = CameraSession::open(settings);
        assert!(result.is_err());
        match result.unwrap_err() {
            CameraError::DeviceNotFound(idx) => assert_eq!(idx, 999),
            // A machine with zero cameras reports that before any index check
            CameraError::NoDevices => {}
            // And one with no camera API at all reports QueryFailed
            CameraError::QueryFailed(_) => {}
            other => panic!("Expected DeviceNotFound, got {:?}", other),
        }
    }
}
