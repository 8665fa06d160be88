//! Default source/destination pair for commands.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::protocol::Envelope;

// ============================================================================
// Constants
// ============================================================================

/// Conventional sender id.
pub const DEFAULT_SOURCE: &str = "sender-0";

/// Conventional id of the receiver platform itself.
pub const DEFAULT_DESTINATION: &str = "receiver-0";

// ============================================================================
// Addressing
// ============================================================================

/// Source and destination used to build envelopes.
///
/// Passed explicitly to command builders instead of relying on globals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Addressing {
    /// Sender id.
    pub source: String,
    /// Destination id.
    pub destination: String,
}

impl Default for Addressing {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE, DEFAULT_DESTINATION)
    }
}

impl Addressing {
    /// Creates an addressing pair.
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Returns a copy with another destination, e.g. an app's transport id.
    #[inline]
    #[must_use]
    pub fn with_destination(&self, destination: impl Into<String>) -> Self {
        Self {
            source: self.source.clone(),
            destination: destination.into(),
        }
    }

    /// Builds the envelope for `namespace`.
    #[inline]
    #[must_use]
    pub fn envelope(&self, namespace: &str) -> Envelope {
        Envelope::new(self.source.clone(), self.destination.clone(), namespace)
    }

    /// Checks both ids are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either id is empty.
    pub fn validate(&self) -> Result<()> {
        if self.source.is_empty() {
            return Err(Error::config("source id must not be empty"));
        }
        if self.destination.is_empty() {
            return Err(Error::config("destination id must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
