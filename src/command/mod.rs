//! Typed command builders.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `addressing` | Default source/destination pair |
//! | `launcher` | Receiver status, launch, stop, volume |
//! | `media` | Default media receiver, `LOAD` |

/// Default source/destination pair for commands.
pub mod addressing;

/// Receiver control commands.
pub mod launcher;

/// Media application commands.
pub mod media;

pub use addressing::{Addressing, DEFAULT_DESTINATION, DEFAULT_SOURCE};
pub use launcher::{Launcher, decode_status};
pub use media::{DEFAULT_MEDIA_RECEIVER, MediaApp, check_media_reply};
