//! Stream transport layer.
//!
//! This module moves frames over a connected duplex stream and correlates
//! requests with their replies. Establishing the stream (TCP, TLS) is the
//! caller's job; anything that is `AsyncRead + AsyncWrite` works.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                         ┌─────────────────┐
//! │  Launcher / Client   │                         │    Receiver     │
//! │          │           │                         │                 │
//! │     Connection       │   [len:u32 BE][body]    │                 │
//! │   (pending table,    │◄───────────────────────►│                 │
//! │    receive loop)     │       duplex stream     │                 │
//! │          │           │                         │                 │
//! │     FrameCodec       │                         │                 │
//! └──────────────────────┘                         └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `codec` | Length-prefixed frame encoding |
//! | `connection` | Request dispatcher and receive loop |
//! | `options` | Connection configuration |

// ============================================================================
// Submodules
// ============================================================================

/// Length-prefixed frame codec.
pub mod codec;

/// Request dispatcher and receive loop.
pub mod connection;

/// Connection configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{FrameCodec, decode_body, decode_frame, encode_frame};
pub use connection::{Connection, EventHandler, Payload, PendingResponse};
pub use options::ConnectionOptions;
