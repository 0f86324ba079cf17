//! Frame conversion and transformation helpers.

use nokhwa::pixel_format::RgbFormat;
use std::time::Instant;

use super::types::{Frame, RGB_BYTES_PER_PIXEL};

/// Convert a nokhwa buffer to a packed-RGB [`Frame`].
///
/// The camera may deliver MJPEG, YUYV, NV12 or similar; nokhwa's
/// `decode_image` converts from the native format to RGB. Returns `None`
/// when the buffer is corrupt or in an unsupported format, in which case
/// the caller should skip the frame.
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        captured_at: Instant::now(),
    })
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let row_len = width * RGB_BYTES_PER_PIXEL;

    for row in frame.data.chunks_exact_mut(row_len) {
        for x in 0..width / 2 {
            let left = x * RGB_BYTES_PER_PIXEL;
            let right = (width - 1 - x) * RGB_BYTES_PER_PIXEL;
            for channel in 0..RGB_BYTES_PER_PIXEL {
                row.swap(left + channel, right + channel);
            }
        }
    }
}
