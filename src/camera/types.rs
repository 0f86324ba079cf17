//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

/// Bytes per pixel for the RGB frames this crate works with.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480 - fast to capture and encode, fine for webhook relays
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720 - when the receiving flow wants larger stills
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

/// A still frame read from the live stream, in packed RGB.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data, 3 bytes per pixel
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// When the frame was pulled off the stream
    pub captured_at: Instant,
}

impl Frame {
    /// Expected byte length for this frame's dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * RGB_BYTES_PER_PIXEL
    }
}

/// Settings for opening a camera stream.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Requested resolution (actual may differ)
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true,
        }
    }
}

/// Errors that can occur during camera operations.
///
/// Permission and device errors are fatal to the capture feature; there
/// is no automatic retry.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("No cameras found")]
    NoDevices,

    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),

    #[error("Failed to open camera: {0}")]
    OpenFailed(String),

    #[error("Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera")]
    PermissionDenied,

    #[error("Camera device {0} not found. Run 'shutterpost list-cameras' to see available devices")]
    DeviceNotFound(u32),

    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),

    #[error("Camera stream is already running")]
    AlreadyRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_info_display() {
        let info = CameraInfo {
            index: 0,
            name: "Test Camera".to_string(),
            description: "Built-in".to_string(),
        };
        assert_eq!(format!("{}", info), "[0] Test Camera (Built-in)");
    }

    #[test]
    fn test_resolution_constants() {
        assert_eq!(Resolution::VGA.width, 640);
        assert_eq!(Resolution::VGA.height, 480);
        assert_eq!(Resolution::HD.width, 1280);
        assert_eq!(Resolution::HD.height, 720);
    }

    #[test]
    fn test_resolution_default_is_vga() {
        assert_eq!(Resolution::default(), Resolution::VGA);
    }

    #[test]
    fn test_camera_settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.device_index, 0);
        assert_eq!(settings.resolution, Resolution::VGA);
        assert_eq!(settings.fps, 30);
        assert!(settings.mirror);
    }

    #[test]
    fn test_frame_expected_len() {
        let frame = Frame {
            data: vec![0; 12],
            width: 2,
            height: 2,
            captured_at: Instant::now(),
        };
        assert_eq!(frame.expected_len(), 12);
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(format!("{}", CameraError::NoDevices), "No cameras found");
        assert_eq!(
            format!("{}", CameraError::QueryFailed("test".to_string())),
            "Failed to query cameras: test"
        );
        assert!(format!("{}", CameraError::PermissionDenied).contains("permission denied"));
        assert!(format!("{}", CameraError::DeviceNotFound(5)).contains("5"));
        assert_eq!(
            format!("{}", CameraError::AlreadyRunning),
            "Camera stream is already running"
        );
    }
}
