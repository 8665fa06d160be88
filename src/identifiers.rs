//! Type-safe identifiers.
//!
//! Newtype wrappers keep correlation ids from being mixed up with other
//! integers on the wire.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Correlation identifier carried as `requestId` in JSON payloads.
///
/// Allocated by the connection, starting at 1. Receivers use `0` for
/// unsolicited broadcasts, so `0` never correlates with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Id used by receivers for unsolicited messages.
    pub const BROADCAST: Self = Self(0);

    /// Creates a request id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` for the broadcast id.
    #[inline]
    #[must_use]
    pub const fn is_broadcast(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_serializes_as_number() {
        let id = RequestId::new(42);
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");

        let parsed: RequestId = serde_json::from_str("7").expect("parse");
        assert_eq!(parsed.as_u64(), 7);
    }

    #[test]
    fn test_broadcast() {
        assert!(RequestId::BROADCAST.is_broadcast());
        assert!(!RequestId::new(1).is_broadcast());
        assert_eq!(RequestId::from(5).to_string(), "5");
    }
}
