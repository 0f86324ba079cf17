//! Camera access and still-frame acquisition.
//!
//! This module provides the live-camera side of the capture client:
//! - Device enumeration via [`list_devices`]
//! - A single live stream per session via [`CameraSession`]
//! - Configuration via [`CameraSettings`] and [`Resolution`]

mod capture_loop;
mod device;
mod frame_utils;
mod session;
mod types;

pub use device::list_devices;
pub use session::CameraSession;
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, Resolution};
