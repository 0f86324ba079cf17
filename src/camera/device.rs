//! Camera device enumeration.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraInfo};

/// List all available camera devices on the system.
///
/// Returns an empty vector (not an error) when no cameras are present,
/// so a machine without a camera can still run `list-cameras` cleanly.
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices_does_not_error() {
        // No camera attached must not be an error, just an empty list
        let result = list_devices();
        assert!(result.is_ok());
    }
}
