//! Error types for the Cast control client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use cast_control::{Launcher, Result};
//!
//! async fn example(launcher: &Launcher) -> Result<()> {
//!     let status = launcher.status().await?;
//!     println!("{} apps running", status.applications.len());
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Framing | [`Error::EmptyFrame`], [`Error::FrameTooLarge`], [`Error::MalformedFrame`] |
//! | Connection | [`Error::ConnectionClosed`], [`Error::Io`] |
//! | Dispatch | [`Error::Protocol`], [`Error::EmptyResponse`], [`Error::RequestTimeout`] |
//! | Commands | [`Error::Decode`], [`Error::Receiver`] |
//! | Collaborators | [`Error::Resolver`], [`Error::NoResolver`], [`Error::Discovery`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when connection options or addressing are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to a command.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Frame Errors
    // ========================================================================
    /// A frame announced a body length of zero.
    #[error("Empty frame")]
    EmptyFrame,

    /// A frame announced a body larger than the configured maximum.
    ///
    /// The body is discarded so the stream stays aligned.
    #[error("Frame of {length} bytes exceeds maximum of {max} bytes")]
    FrameTooLarge {
        /// Announced body length.
        length: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Frame body could not be encoded or decoded.
    #[error("Malformed frame: {message}")]
    MalformedFrame {
        /// Description of the framing problem.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection closed, either by the peer or by shutdown.
    ///
    /// Terminal for the connection.
    #[error("Connection closed")]
    ConnectionClosed,

    /// IO error on the underlying stream.
    ///
    /// Terminal for the connection.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// Protocol violation or unusable request.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// The request was abandoned without a response.
    ///
    /// Returned to every pending waiter when the connection terminates.
    #[error("Empty response for {command} (request {request_id})")]
    EmptyResponse {
        /// Command type of the abandoned request.
        command: String,
        /// The abandoned request ID.
        request_id: RequestId,
    },

    /// No response arrived within the bounded wait.
    #[error("{command} (request {request_id}) timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// Command type of the request.
        command: String,
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// A response payload did not match the expected schema.
    #[error("Failed to decode {command} response: {message} (payload: {payload})")]
    Decode {
        /// Command type that produced the response.
        command: String,
        /// Decoder message naming the failing field.
        message: String,
        /// Offending payload, lossily converted to text.
        payload: String,
    },

    /// The receiver answered with an error reply instead of a status.
    #[error("Receiver rejected {command}: {kind}{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    Receiver {
        /// Command type that was rejected.
        command: String,
        /// Reply type, e.g. `LAUNCH_ERROR`.
        kind: String,
        /// Reason reported by the receiver, if any.
        reason: Option<String>,
    },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// A URL resolver could not handle a URL.
    ///
    /// Non-fatal for a resolver chain, which tries the next resolver.
    #[error("Resolver {resolver} failed: {message}")]
    Resolver {
        /// Name of the resolver.
        resolver: String,
        /// Description of the failure.
        message: String,
    },

    /// No resolver in the chain could handle the URL.
    #[error("No supported resolver for {url}")]
    NoResolver {
        /// The URL that nobody could handle.
        url: String,
    },

    /// Device discovery failed or found nothing.
    #[error("Discovery failed: {message}")]
    Discovery {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a malformed frame error.
    #[inline]
    pub fn malformed_frame(message: impl Into<String>) -> Self {
        Self::MalformedFrame {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an empty response error.
    #[inline]
    pub fn empty_response(command: impl Into<String>, request_id: RequestId) -> Self {
        Self::EmptyResponse {
            command: command.into(),
            request_id,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(
        command: impl Into<String>,
        request_id: RequestId,
        timeout_ms: u64,
    ) -> Self {
        Self::RequestTimeout {
            command: command.into(),
            request_id,
            timeout_ms,
        }
    }

    /// Creates a decode error, keeping the offending payload as context.
    #[inline]
    pub fn decode(command: impl Into<String>, message: impl Into<String>, payload: &[u8]) -> Self {
        Self::Decode {
            command: command.into(),
            message: message.into(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        }
    }

    /// Creates a receiver error.
    #[inline]
    pub fn receiver(
        command: impl Into<String>,
        kind: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self::Receiver {
            command: command.into(),
            kind: kind.into(),
            reason,
        }
    }

    /// Creates a resolver error.
    #[inline]
    pub fn resolver(resolver: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolver {
            resolver: resolver.into(),
            message: message.into(),
        }
    }

    /// Creates a no-resolver error.
    #[inline]
    pub fn no_resolver(url: impl Into<String>) -> Self {
        Self::NoResolver { url: url.into() }
    }

    /// Creates a discovery error.
    #[inline]
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the connection cannot be used after this error.
    ///
    /// The receive loop stops and abandons pending requests on these.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::Io(_))
    }

    /// Returns `true` if this is a framing error.
    #[inline]
    #[must_use]
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyFrame | Self::FrameTooLarge { .. } | Self::MalformedFrame { .. }
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::Io(_) | Self::EmptyResponse { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors leave the connection usable.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptyFrame
                | Self::FrameTooLarge { .. }
                | Self::MalformedFrame { .. }
                | Self::RequestTimeout { .. }
                | Self::Resolver { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
