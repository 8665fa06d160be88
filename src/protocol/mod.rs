//! Protocol message types.
//!
//! This module defines the messages exchanged between the sender (Rust)
//! and the receiver device.
//!
//! # Protocol Overview
//!
//! | Layer | Type | Purpose |
//! |-------|------|---------|
//! | Addressing | [`Envelope`] | source, destination, namespace |
//! | Body | [`CastMessage`] | protobuf message carrying the payload |
//! | Payload | [`ReceiverCommand`] etc. | JSON object tagged by `type` |
//! | Reply | [`StatusReply`] | `status` or receiver error |
//! | Unsolicited | [`Event`] | broadcasts, heartbeat pings |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command payloads by namespace |
//! | `envelope` | Addressing and namespaces |
//! | `event` | Event and EventReply types |
//! | `media` | Media items and replies |
//! | `message` | Protobuf frame body |
//! | `status` | Status, Application, Volume |

// ============================================================================
// Submodules
// ============================================================================

/// Command payloads organized by namespace.
pub mod command;

/// Message addressing.
pub mod envelope;

/// Unsolicited message types.
pub mod event;

/// Media namespace types.
pub mod media;

/// Protobuf frame body.
pub mod message;

/// Receiver status types.
pub mod status;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{ConnectionCommand, HeartbeatCommand, MediaCommand, ReceiverCommand};
pub use envelope::{Envelope, namespace};
pub use event::{Event, EventReply};
pub use media::{MediaItem, MediaReply, StreamType};
pub use message::{CastMessage, PayloadType, ProtocolVersion};
pub use status::{AppNamespace, Application, Status, StatusReply, Volume};
