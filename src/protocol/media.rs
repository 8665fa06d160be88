//! Media namespace types.
//!
//! # Format
//!
//! ```json
//! {
//!   "type": "LOAD",
//!   "media": { "contentId": "https://cdn.example/v.mp4", "contentType": "video/mp4", "streamType": "BUFFERED" },
//!   "autoplay": true,
//!   "currentTime": 0.0,
//!   "requestId": 3
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// StreamType
// ============================================================================

/// How the receiver should treat the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamType {
    /// Finite content with a known duration.
    #[default]
    Buffered,
    /// Live stream.
    Live,
    /// Unspecified.
    None,
}

// ============================================================================
// MediaItem
// ============================================================================

/// Content to load into a media application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// URL or identifier of the content.
    pub content_id: String,
    /// MIME type, e.g. `video/mp4`.
    pub content_type: String,
    /// Stream kind.
    pub stream_type: StreamType,
}

impl MediaItem {
    /// Creates a buffered item.
    #[must_use]
    pub fn new(content_id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            content_type: content_type.into(),
            stream_type: StreamType::Buffered,
        }
    }

    /// Sets the stream kind.
    #[inline]
    #[must_use]
    pub fn with_stream_type(mut self, stream_type: StreamType) -> Self {
        self.stream_type = stream_type;
        self
    }
}

// ============================================================================
// MediaReply
// ============================================================================

/// Routing view of a media namespace reply.
///
/// Successful replies are `MEDIA_STATUS`; failures such as `LOAD_FAILED` or
/// `INVALID_REQUEST` may carry a `reason`.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaReply {
    /// Reply type.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Failure reason.
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
