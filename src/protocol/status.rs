//! Receiver status types.
//!
//! # Format
//!
//! ```json
//! {
//!   "requestId": 1,
//!   "type": "RECEIVER_STATUS",
//!   "status": {
//!     "applications": [{ "appId": "CC1AD845", "displayName": "Default Media Receiver" }],
//!     "volume": { "level": 1.0, "muted": false }
//!   }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Volume
// ============================================================================

/// Receiver volume.
///
/// Only populated fields are serialized; absent fields are omitted, not null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Level in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,

    /// Mute state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

impl Volume {
    /// Volume update that only sets the level.
    #[inline]
    #[must_use]
    pub const fn level(level: f64) -> Self {
        Self {
            level: Some(level),
            muted: None,
        }
    }

    /// Volume update that only sets the mute state.
    #[inline]
    #[must_use]
    pub const fn muted(muted: bool) -> Self {
        Self {
            level: None,
            muted: Some(muted),
        }
    }
}

// ============================================================================
// Application
// ============================================================================

/// A namespace an application listens on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppNamespace {
    /// Namespace string.
    pub name: String,
}

/// An application running on the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application id, e.g. `CC1AD845`.
    pub app_id: String,

    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Session id of the running instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Destination id for messages to the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,

    /// Status line shown by the receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    /// Namespaces the application handles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<AppNamespace>,

    /// Any other receiver-reported field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Application {
    /// Returns `true` if the application handles `namespace`.
    #[must_use]
    pub fn supports(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|ns| ns.name == namespace)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Snapshot of the receiver's applications and volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// Running applications, in receiver order.
    #[serde(default)]
    pub applications: Vec<Application>,

    /// Volume state.
    #[serde(default)]
    pub volume: Volume,
}

impl Status {
    /// Returns the running application with the given id.
    #[must_use]
    pub fn app_with_id(&self, app_id: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.app_id == app_id)
    }
}

// ============================================================================
// StatusReply
// ============================================================================

/// Reply to a receiver command.
///
/// Successful replies carry `status`; rejected commands carry a `type`
/// such as `LAUNCH_ERROR` or `INVALID_REQUEST` and an optional `reason`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    /// Reply type.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Status snapshot.
    #[serde(default)]
    pub status: Option<Status>,

    /// Failure reason.
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_volume_level_only() {
        let json = serde_json::to_string(&Volume::level(0.5)).expect("serialize");
        assert_eq!(json, r#"{"level":0.5}"#);
    }

    #[test]
    fn test_volume_muted_only() {
        let json = serde_json::to_string(&Volume::muted(true)).expect("serialize");
        assert_eq!(json, r#"{"muted":true}"#);
    }

    #[test]
    fn test_status_decoding_keeps_extra_fields() {
        let value = json!({
            "applications": [{
                "appId": "CC1AD845",
                "displayName": "Default Media Receiver",
                "transportId": "web-4",
                "namespaces": [{ "name": "urn:x-cast:com.google.cast.media" }],
                "isIdleScreen": false
            }],
            "volume": { "level": 0.25, "muted": false }
        });

        let status: Status = serde_json::from_value(value).expect("parse");
        let app = status.app_with_id("CC1AD845").expect("app present");

        assert_eq!(app.transport_id.as_deref(), Some("web-4"));
        assert!(app.supports("urn:x-cast:com.google.cast.media"));
        assert_eq!(app.extra.get("isIdleScreen"), Some(&json!(false)));
        assert_eq!(status.volume.level, Some(0.25));
        assert!(status.app_with_id("233637DE").is_none());
    }

    #[test]
    fn test_status_defaults() {
        let status: Status = serde_json::from_str("{}").expect("parse");
        assert!(status.applications.is_empty());
        assert_eq!(status.volume, Volume::default());
    }

    #[test]
    fn test_error_reply() {
        let reply: StatusReply = serde_json::from_str(
            r#"{"requestId":4,"type":"LAUNCH_ERROR","reason":"NOT_FOUND"}"#,
        )
        .expect("parse");

        assert!(reply.status.is_none());
        assert_eq!(reply.kind.as_deref(), Some("LAUNCH_ERROR"));
        assert_eq!(reply.reason.as_deref(), Some("NOT_FOUND"));
    }
}
