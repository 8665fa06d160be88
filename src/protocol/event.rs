//! Unsolicited message types.
//!
//! Events are messages from the receiver that match no pending request:
//! status broadcasts (`requestId` 0), heartbeat pings, media updates.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use super::{Envelope, Status};

// ============================================================================
// Event
// ============================================================================

/// An unsolicited message from the receiver.
#[derive(Debug, Clone)]
pub struct Event {
    /// Addressing of the message as received.
    pub envelope: Envelope,

    /// Raw UTF-8 payload.
    pub payload: Vec<u8>,
}

/// Minimal view of a payload used for routing.
#[derive(Debug, Deserialize)]
struct EventHeader {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Broadcast status wrapper.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: Status,
}

impl Event {
    /// Creates a new event.
    #[inline]
    #[must_use]
    pub fn new(envelope: Envelope, payload: Vec<u8>) -> Self {
        Self { envelope, payload }
    }

    /// Returns the namespace the event arrived on.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.envelope.namespace()
    }

    /// Returns the payload `type` field, if the payload is a JSON object with one.
    #[must_use]
    pub fn kind(&self) -> Option<String> {
        serde_json::from_slice::<EventHeader>(&self.payload)
            .ok()
            .and_then(|header| header.kind)
    }

    /// Parses the payload as JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.payload).ok()
    }

    /// Decodes a `RECEIVER_STATUS` broadcast.
    ///
    /// Returns `None` for any other payload.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        if self.kind().as_deref() != Some("RECEIVER_STATUS") {
            return None;
        }
        serde_json::from_slice::<StatusEnvelope>(&self.payload)
            .ok()
            .map(|wrapper| wrapper.status)
    }
}

// ============================================================================
// EventReply
// ============================================================================

/// A message to send back in answer to an event.
#[derive(Debug, Clone)]
pub struct EventReply {
    /// Addressing of the reply.
    pub envelope: Envelope,

    /// Raw UTF-8 payload.
    pub payload: Vec<u8>,
}

impl EventReply {
    /// Creates a reply addressed back to the event's sender.
    #[inline]
    #[must_use]
    pub fn to(event: &Event, payload: Vec<u8>) -> Self {
        Self {
            envelope: event.envelope.reply(),
            payload,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
