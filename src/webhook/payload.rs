//! The JSON payload the receiving flow consumes.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Sentinel user identifier used when none is entered.
pub const DEFAULT_USER_ID: &str = "anonymous";

/// One submission: the full gallery plus who and when.
///
/// Wire shape, consumed by the receiving automation flow:
///
/// ```json
/// {
///   "images": ["data:image/jpeg;base64,<...>", ...],
///   "userId": "<string>",
///   "timestamp": "<ISO-8601>"
/// }
/// ```
///
/// The flow derives one stored file per array element, stripping the
/// data-URL prefix and decoding the remainder. Constructed fresh at
/// submit time; immutable once sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Encoded images in capture order.
    pub images: Vec<String>,
    /// Who submitted; `"anonymous"` when unset.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Submission time, RFC 3339 / ISO-8601 in UTC.
    pub timestamp: String,
}

impl SubmissionPayload {
    /// Build a payload for the given images, stamped with the current
    /// UTC time. A blank or missing user id falls back to
    /// [`DEFAULT_USER_ID`].
    pub fn new(images: Vec<String>, user_id: Option<&str>) -> Self {
        Self {
            images,
            user_id: resolve_user_id(user_id),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Trim the entered user id, substituting the sentinel when blank.
pub fn resolve_user_id(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_USER_ID.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_resolve_user_id_passes_through() {
        assert_eq!(resolve_user_id(Some("alice")), "alice");
    }

    #[test]
    fn test_resolve_user_id_trims_whitespace() {
        assert_eq!(resolve_user_id(Some("  bob  ")), "bob");
    }

    #[test]
    fn test_resolve_user_id_blank_falls_back() {
        assert_eq!(resolve_user_id(Some("")), DEFAULT_USER_ID);
        assert_eq!(resolve_user_id(Some("   ")), DEFAULT_USER_ID);
        assert_eq!(resolve_user_id(None), DEFAULT_USER_ID);
    }

    #[test]
    fn test_payload_serializes_with_wire_field_names() {
        let payload = SubmissionPayload {
            images: vec!["data:image/jpeg;base64,AAAA".to_string()],
            user_id: "alice".to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"images\""));
        assert!(json.contains("\"userId\":\"alice\""));
        assert!(json.contains("\"timestamp\":\"2024-01-01T00:00:00+00:00\""));
        // The Rust-side field name must not leak onto the wire
        assert!(!json.contains("user_id"));
    }

    #[test]
    fn test_new_stamps_parseable_timestamp() {
        let payload = SubmissionPayload::new(vec![], Some("alice"));
        assert!(DateTime::parse_from_rfc3339(&payload.timestamp).is_ok());
    }

    #[test]
    fn test_new_defaults_user_id() {
        let payload = SubmissionPayload::new(vec![], None);
        assert_eq!(payload.user_id, "anonymous");
    }

    #[test]
    fn test_new_preserves_image_order() {
        let payload = SubmissionPayload::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            Some("alice"),
        );
        assert_eq!(payload.images, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_payload_round_trips_through_json() {
        let payload = SubmissionPayload::new(vec!["data:image/jpeg;base64,Zm9v".to_string()], None);
        let json = serde_json::to_string(&payload).unwrap();
        let back: SubmissionPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.images, payload.images);
        assert_eq!(back.user_id, payload.user_id);
        assert_eq!(back.timestamp, payload.timestamp);
    }
}
