//! Message addressing.

use std::fmt;

// ============================================================================
// Namespaces
// ============================================================================

/// Well-known namespaces.
///
/// The namespace selects the receiver-side handler for a message.
pub mod namespace {
    /// Virtual connection management (`CONNECT` / `CLOSE`).
    pub const CONNECTION: &str = "urn:x-cast:com.google.cast.tp.connection";

    /// Keep-alive (`PING` / `PONG`).
    pub const HEARTBEAT: &str = "urn:x-cast:com.google.cast.tp.heartbeat";

    /// Receiver control (status, launch, stop, volume).
    pub const RECEIVER: &str = "urn:x-cast:com.google.cast.receiver";

    /// Media playback control.
    pub const MEDIA: &str = "urn:x-cast:com.google.cast.media";
}

// ============================================================================
// Envelope
// ============================================================================

/// Addressing triple attached to every message.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Envelope {
    source: String,
    destination: String,
    namespace: String,
}

impl Envelope {
    /// Creates a new envelope.
    #[inline]
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            namespace: namespace.into(),
        }
    }

    /// Returns the sender id.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the destination id.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Returns the namespace.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the envelope for a reply: source and destination swapped.
    #[inline]
    #[must_use]
    pub fn reply(&self) -> Self {
        Self {
            source: self.destination.clone(),
            destination: self.source.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.source, self.destination, self.namespace)
    }
}

// ============================================================================
// Tests
// ============================================================================
