//! Connection configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use cast_control::ConnectionOptions;
//!
//! let options = ConnectionOptions::new()
//!     .with_request_timeout(Duration::from_secs(5))
//!     .with_max_pending_requests(16);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default bounded wait for a correlated reply.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit on in-flight requests per connection.
pub const DEFAULT_MAX_PENDING_REQUESTS: usize = 100;

/// Default limit on a frame body, in bytes.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024;

// ============================================================================
// ConnectionOptions
// ============================================================================

/// Per-connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Bounded wait used by command-level calls.
    pub request_timeout: Duration,

    /// In-flight request limit. New requests beyond it are rejected.
    pub max_pending_requests: usize,

    /// Largest accepted frame body.
    pub max_frame_size: u32,

    /// Answer heartbeat `PING` with `PONG` from the receive loop.
    pub auto_heartbeat: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pending_requests: DEFAULT_MAX_PENDING_REQUESTS,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            auto_heartbeat: true,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionOptions {
    /// Sets the bounded wait for correlated replies.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the in-flight request limit.
    #[inline]
    #[must_use]
    pub fn with_max_pending_requests(mut self, max: usize) -> Self {
        self.max_pending_requests = max;
        self
    }

    /// Sets the largest accepted frame body.
    #[inline]
    #[must_use]
    pub fn with_max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }

    /// Disables the automatic heartbeat answer.
    #[inline]
    #[must_use]
    pub fn without_auto_heartbeat(mut self) -> Self {
        self.auto_heartbeat = false;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConnectionOptions {
    /// Checks the options for values that would make the connection unusable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for zero limits or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::config("request_timeout must be positive"));
        }
        if self.max_pending_requests == 0 {
            return Err(Error::config("max_pending_requests must be positive"));
        }
        if self.max_frame_size == 0 {
            return Err(Error::config("max_frame_size must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.request_timeout, Duration::from_secs(30));
        assert_eq!(options.max_pending_requests, 100);
        assert_eq!(options.max_frame_size, 64 * 1024);
        assert!(options.auto_heartbeat);
        tokio_test::assert_ok!(options.validate());
    }

    #[test]
    fn test_builder_chain() {
        let options = ConnectionOptions::new()
            .with_request_timeout(Duration::from_millis(250))
            .with_max_pending_requests(4)
            .with_max_frame_size(1024)
            .without_auto_heartbeat();

        assert_eq!(options.request_timeout, Duration::from_millis(250));
        assert_eq!(options.max_pending_requests, 4);
        assert_eq!(options.max_frame_size, 1024);
        assert!(!options.auto_heartbeat);
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(matches!(
            ConnectionOptions::new().with_max_pending_requests(0).validate(),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ConnectionOptions::new()
                .with_request_timeout(Duration::ZERO)
                .validate(),
            Err(Error::Config { .. })
        ));
        tokio_test::assert_err!(ConnectionOptions::new().with_max_frame_size(0).validate());
    }
}
