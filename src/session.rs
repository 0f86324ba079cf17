//! The capture session: gallery, webhook client, and the submit guard.
//!
//! Owns all mutable state of the capture workflow. Two implicit state
//! axes: {empty, staged} from the gallery, and {ready, submitting} from
//! the in-flight flag. Submit is only possible from staged+ready; a
//! successful submit returns the session to empty+ready, a failed one
//! leaves the gallery exactly as it was.

use crate::camera::Frame;
use crate::gallery::{CapturedImage, Gallery, GalleryError};
use crate::webhook::{SubmissionPayload, WebhookClient, WebhookError};

/// What a successful submission looked like, for the success indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// How many images went out.
    pub image_count: usize,
    /// Resolved user id the payload carried.
    pub user_id: String,
    /// Timestamp the payload carried.
    pub timestamp: String,
}

/// One user's capture-curate-submit workflow.
pub struct CaptureSession {
    gallery: Gallery,
    client: WebhookClient,
    jpeg_quality: u8,
    submitting: bool,
}

impl CaptureSession {
    /// Create a session with an empty gallery.
    pub fn new(client: WebhookClient, max_photos: usize, jpeg_quality: u8) -> Self {
        Self {
            gallery: Gallery::new(max_photos),
            client,
            jpeg_quality,
            submitting: false,
        }
    }

    /// Encode a frame and stage it at the end of the gallery.
    ///
    /// Returns the new gallery length. Callers should re-render the
    /// gallery view right after, since positional indices shift on every
    /// mutation.
    ///
    /// # Errors
    /// * `SessionError::SubmissionInFlight` - a submit is outstanding
    /// * `SessionError::Gallery` - gallery full, or the frame failed to
    ///   encode
    pub fn capture(&mut self, frame: &Frame) -> Result<usize, SessionError> {
        if self.submitting {
            return Err(SessionError::SubmissionInFlight);
        }
        let image = CapturedImage::from_frame(frame, self.jpeg_quality)?;
        self.gallery.push(image)?;
        log::debug!("Captured still {}/{}", self.gallery.len(), self.gallery.capacity());
        Ok(self.gallery.len())
    }

    /// Remove the staged photo at `index`.
    ///
    /// # Errors
    /// * `SessionError::SubmissionInFlight` - a submit is outstanding
    /// * `SessionError::Gallery` - `index` is out of range; the gallery
    ///   is untouched
    pub fn delete_at(&mut self, index: usize) -> Result<(), SessionError> {
        if self.submitting {
            return Err(SessionError::SubmissionInFlight);
        }
        self.gallery.remove(index)?;
        log::debug!("Deleted photo {}, {} staged", index, self.gallery.len());
        Ok(())
    }

    /// Submit the full gallery as one payload.
    ///
    /// Single-slot: a second submit while one is outstanding is rejected
    /// rather than duplicated. On success the gallery is cleared and a
    /// receipt returned; on any failure the gallery and its contents are
    /// left unchanged so the user can retry.
    ///
    /// # Errors
    /// * `SessionError::EmptyGallery` - nothing staged; submit is not
    ///   available from this state
    /// * `SessionError::SubmissionInFlight` - a submit is outstanding
    /// * `SessionError::Webhook` - request failure or non-success status
    pub async fn submit(&mut self, user_id: Option<&str>) -> Result<SubmitReceipt, SessionError> {
        if self.gallery.is_empty() {
            return Err(SessionError::EmptyGallery);
        }
        if self.submitting {
            return Err(SessionError::SubmissionInFlight);
        }

        self.submitting = true;
        let payload = SubmissionPayload::new(self.gallery.data_urls(), user_id);
        let result = self.client.post_submission(&payload).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                let receipt = SubmitReceipt {
                    image_count: payload.images.len(),
                    user_id: payload.user_id,
                    timestamp: payload.timestamp,
                };
                self.gallery.clear();
                log::info!("Submitted {} image(s) as '{}'", receipt.image_count, receipt.user_id);
                Ok(receipt)
            }
            Err(e) => {
                // Gallery stays intact for retry
                log::warn!("Submission failed, keeping {} staged image(s)", self.gallery.len());
                Err(SessionError::Webhook(e))
            }
        }
    }

    /// The staged gallery, for rendering.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Whether submit is currently available.
    pub fn can_submit(&self) -> bool {
        !self.gallery.is_empty() && !self.submitting
    }

    /// Whether a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Nothing to submit, capture a photo first")]
    EmptyGallery,

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error(transparent)]
    Gallery(#[from] GalleryError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}
