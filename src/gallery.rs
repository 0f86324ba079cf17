//! In-memory photo gallery: encoded stills, ordered by capture.
//!
//! Captured frames are JPEG-encoded and carried as self-describing data
//! URLs (`data:image/jpeg;base64,...`), the shape the receiving webhook
//! flow decodes on its side. The gallery is an explicitly owned container
//! passed to the session; there is no ambient global.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use std::io::Cursor;

use crate::camera::Frame;

/// Marker prefixed to every encoded image so the payload is self-describing.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Number of photos a gallery holds by default, the product's stated limit.
pub const DEFAULT_MAX_PHOTOS: usize = 10;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// One encoded still frame.
///
/// Immutable once created; the data URL is what goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    data_url: String,
    width: u32,
    height: u32,
}

impl CapturedImage {
    /// Encode an RGB frame to a JPEG data URL at the given quality.
    ///
    /// # Errors
    /// * `GalleryError::MalformedFrame` - when the frame's byte length
    ///   doesn't match its dimensions
    /// * `GalleryError::EncodeFailed` - when JPEG encoding fails
    pub fn from_frame(frame: &Frame, quality: u8) -> Result<Self, GalleryError> {
        if frame.data.len() != frame.expected_len() {
            return Err(GalleryError::MalformedFrame {
                expected: frame.expected_len(),
                actual: frame.data.len(),
            });
        }

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality);
        encoder
            .encode(&frame.data, frame.width, frame.height, ExtendedColorType::Rgb8)
            .map_err(|e| GalleryError::EncodeFailed(e.to_string()))?;

        let mut data_url = String::with_capacity(DATA_URL_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
        data_url.push_str(DATA_URL_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(&jpeg, &mut data_url);

        Ok(Self {
            data_url,
            width: frame.width,
            height: frame.height,
        })
    }

    /// The full `data:image/jpeg;base64,...` string.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Source frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded size in bytes (length of the data URL).
    pub fn encoded_len(&self) -> usize {
        self.data_url.len()
    }
}

/// Ordered, bounded collection of captured images.
///
/// Insertion order is capture order and is what the payload preserves.
#[derive(Debug, Clone)]
pub struct Gallery {
    images: Vec<CapturedImage>,
    capacity: usize,
}

impl Gallery {
    /// Create an empty gallery holding at most `capacity` photos.
    pub fn new(capacity: usize) -> Self {
        Self {
            images: Vec::new(),
            capacity,
        }
    }

    /// Append an image, preserving capture order.
    ///
    /// # Errors
    /// * `GalleryError::Full` - the gallery already holds `capacity`
    ///   photos; the image is not added
    pub fn push(&mut self, image: CapturedImage) -> Result<(), GalleryError> {
        if self.images.len() >= self.capacity {
            return Err(GalleryError::Full {
                capacity: self.capacity,
            });
        }
        self.images.push(image);
        Ok(())
    }

    /// Remove the image at `index`, shifting later images down.
    ///
    /// # Errors
    /// * `GalleryError::IndexOutOfRange` - `index` is not a valid
    ///   position; the sequence is left untouched
    pub fn remove(&mut self, index: usize) -> Result<CapturedImage, GalleryError> {
        if index >= self.images.len() {
            return Err(GalleryError::IndexOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        Ok(self.images.remove(index))
    }

    /// Drop all images.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Number of images currently staged.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the gallery holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether the gallery is at capacity.
    pub fn is_full(&self) -> bool {
        self.images.len() >= self.capacity
    }

    /// Maximum number of photos this gallery holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The staged images in capture order.
    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    /// Data URLs of the staged images, in capture order.
    pub fn data_urls(&self) -> Vec<String> {
        self.images.iter().map(|i| i.data_url.clone()).collect()
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PHOTOS)
    }
}

/// Errors from gallery operations.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("Gallery is full ({capacity} photos). Delete one before capturing again")]
    Full { capacity: usize },

    #[error("No photo at index {index} ({len} staged)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Frame byte length {actual} doesn't match dimensions (expected {expected})")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("JPEG encoding failed: {0}")]
    EncodeFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn test_frame(width: u32, height: u32, fill: u8) -> Frame {
        Frame {
            data: vec![fill; (width * height * 3) as usize],
            width,
            height,
            captured_at: Instant::now(),
        }
    }

    fn test_image(fill: u8) -> CapturedImage {
        CapturedImage::from_frame(&test_frame(4, 4, fill), DEFAULT_JPEG_QUALITY).unwrap()
    }

    #[test]
    fn test_from_frame_produces_data_url() {
        let image = test_image(128);
        assert!(image.data_url().starts_with(DATA_URL_PREFIX));
        assert!(image.encoded_len() > DATA_URL_PREFIX.len());
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);
    }

    #[test]
    fn test_from_frame_payload_is_valid_base64() {
        let image = test_image(42);
        let encoded = &image.data_url()[DATA_URL_PREFIX.len()..];
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        // JPEG magic bytes
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_from_frame_rejects_malformed_frame() {
        let frame = Frame {
            data: vec![0; 5], // not a multiple of 4x4x3
            width: 4,
            height: 4,
            captured_at: Instant::now(),
        };
        let result = CapturedImage::from_frame(&frame, 80);
        assert!(matches!(
            result,
            Err(GalleryError::MalformedFrame {
                expected: 48,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_push_preserves_capture_order() {
        let mut gallery = Gallery::new(10);
        let first = test_image(1);
        let second = test_image(2);
        let third = test_image(3);

        gallery.push(first.clone()).unwrap();
        gallery.push(second.clone()).unwrap();
        gallery.push(third.clone()).unwrap();

        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.images()[0], first);
        assert_eq!(gallery.images()[1], second);
        assert_eq!(gallery.images()[2], third);
    }

    #[test]
    fn test_push_rejects_when_full() {
        let mut gallery = Gallery::new(2);
        gallery.push(test_image(1)).unwrap();
        gallery.push(test_image(2)).unwrap();
        assert!(gallery.is_full());

        let result = gallery.push(test_image(3));
        assert!(matches!(result, Err(GalleryError::Full { capacity: 2 })));
        // The rejected image must not land
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn test_remove_shifts_later_images() {
        let mut gallery = Gallery::new(10);
        let first = test_image(1);
        let second = test_image(2);
        let third = test_image(3);
        gallery.push(first.clone()).unwrap();
        gallery.push(second.clone()).unwrap();
        gallery.push(third.clone()).unwrap();

        let removed = gallery.remove(1).unwrap();
        assert_eq!(removed, second);
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.images()[0], first);
        assert_eq!(gallery.images()[1], third);
    }

    #[test]
    fn test_remove_out_of_range_leaves_gallery_intact() {
        let mut gallery = Gallery::new(10);
        gallery.push(test_image(1)).unwrap();

        let result = gallery.remove(5);
        assert!(matches!(
            result,
            Err(GalleryError::IndexOutOfRange { index: 5, len: 1 })
        ));
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_remove_from_empty_gallery_is_defined_error() {
        let mut gallery = Gallery::new(10);
        let result = gallery.remove(0);
        assert!(matches!(
            result,
            Err(GalleryError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_length_tracks_captures_minus_deletes() {
        let mut gallery = Gallery::new(10);
        for i in 0..5 {
            gallery.push(test_image(i)).unwrap();
        }
        gallery.remove(0).unwrap();
        gallery.remove(2).unwrap();
        assert_eq!(gallery.len(), 3);

        // Failed delete must not change the count
        let _ = gallery.remove(99);
        assert_eq!(gallery.len(), 3);
    }

    #[test]
    fn test_clear_empties_gallery() {
        let mut gallery = Gallery::new(10);
        gallery.push(test_image(1)).unwrap();
        gallery.push(test_image(2)).unwrap();
        gallery.clear();
        assert!(gallery.is_empty());
        assert_eq!(gallery.len(), 0);
    }

    #[test]
    fn test_data_urls_match_images() {
        let mut gallery = Gallery::new(10);
        let first = test_image(7);
        let second = test_image(9);
        gallery.push(first.clone()).unwrap();
        gallery.push(second.clone()).unwrap();

        let urls = gallery.data_urls();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], first.data_url());
        assert_eq!(urls[1], second.data_url());
    }

    #[test]
    fn test_default_capacity_is_ten() {
        let gallery = Gallery::default();
        assert_eq!(gallery.capacity(), 10);
    }

    #[test]
    fn test_quality_affects_encoded_size() {
        let frame = test_frame(32, 32, 100);
        let low = CapturedImage::from_frame(&frame, 10).unwrap();
        let high = CapturedImage::from_frame(&frame, 95).unwrap();
        // Flat gray compresses well either way, but higher quality never shrinks it
        assert!(high.encoded_len() >= low.encoded_len());
    }
}
