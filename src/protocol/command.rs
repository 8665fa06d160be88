//! Command payloads organized by namespace.
//!
//! Every command is a JSON object tagged by `type`. The connection injects
//! `requestId` into correlated commands before sending.
//!
//! # Command Namespaces
//!
//! | Namespace | Commands |
//! |-----------|----------|
//! | connection | `CONNECT`, `CLOSE` |
//! | heartbeat | `PING`, `PONG` |
//! | receiver | `GET_STATUS`, `LAUNCH`, `STOP`, `SET_VOLUME` |
//! | media | `LOAD` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use super::{MediaItem, Volume};

// ============================================================================
// Connection Commands
// ============================================================================

/// Virtual connection management. Never correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionCommand {
    /// Open a virtual connection to the destination.
    Connect,
    /// Close the virtual connection.
    Close,
}

// ============================================================================
// Heartbeat Commands
// ============================================================================

/// Keep-alive messages. Never correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeartbeatCommand {
    /// Liveness check.
    Ping,
    /// Answer to [`HeartbeatCommand::Ping`].
    Pong,
}

// ============================================================================
// Receiver Commands
// ============================================================================

/// Receiver control commands. Each is answered by a status reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiverCommand {
    /// Query receiver status.
    GetStatus,

    /// Launch an application.
    Launch {
        /// Application id.
        #[serde(rename = "appId")]
        app_id: String,
    },

    /// Stop the running application.
    Stop,

    /// Change volume level or mute state.
    SetVolume {
        /// Fields to change. Absent fields are left alone.
        volume: Volume,
    },
}

impl ReceiverCommand {
    /// Returns the wire `type` of the command.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetStatus => "GET_STATUS",
            Self::Launch { .. } => "LAUNCH",
            Self::Stop => "STOP",
            Self::SetVolume { .. } => "SET_VOLUME",
        }
    }
}

// ============================================================================
// Media Commands
// ============================================================================

/// Commands for a running media application, sent to its transport id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaCommand {
    /// Load content into the application.
    Load {
        /// Content to play.
        media: MediaItem,
        /// Start playing once loaded.
        autoplay: bool,
        /// Start position in seconds.
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
}

impl MediaCommand {
    /// Loads `media` from the start and plays it.
    #[must_use]
    pub fn load(media: MediaItem) -> Self {
        Self::Load {
            media,
            autoplay: true,
            current_time: 0.0,
        }
    }

    /// Returns the wire `type` of the command.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "LOAD",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
