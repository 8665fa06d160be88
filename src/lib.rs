//! Cast Control - async client for the Cast v2 receiver-control protocol.
//!
//! This library drives a receiver device (launch applications, query
//! status, control volume) over one long-lived duplex stream.
//!
//! # Architecture
//!
//! The client multiplexes many logical conversations over one stream:
//!
//! - **Codec**: 4-byte big-endian length prefix + protobuf body per frame
//! - **Connection**: assigns `requestId`s, runs the single receive loop,
//!   routes each reply to the task waiting for it
//! - **Launcher**: typed receiver commands on top of the connection
//! - **MediaApp**: loads content into the default media receiver
//!
//! Key design principles:
//!
//! - One receive loop per connection; any number of concurrent callers
//! - Connection loss resolves every pending request with an error
//! - Every wait for a reply is bounded
//!
//! # Quick Start
//!
//! ```no_run
//! use cast_control::{Addressing, Client, ConnectionOptions, Result};
//!
//! # async fn example(stream: tokio::io::DuplexStream) -> Result<()> {
//! // `stream` is an already connected (TLS) stream to the receiver.
//! let client = Client::connect(stream, ConnectionOptions::default(), Addressing::default()).await?;
//! let launcher = client.launcher();
//!
//! let status = launcher.status().await?;
//! let status = launcher.launch("CC1AD845", &[status]).await?;
//! launcher.set_volume(0.5).await?;
//!
//! println!("running: {:?}", status.applications);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Connected receiver session |
//! | [`command`] | Typed command builders |
//! | [`discovery`] | Device discovery seam |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Message types |
//! | [`resolver`] | URL resolver chain |
//! | [`transport`] | Frame codec and request dispatcher |

// ============================================================================
// Modules
// ============================================================================

/// Connected receiver session.
pub mod client;

/// Typed command builders.
///
/// - [`Launcher`] - receiver status, launch, stop, volume
/// - [`MediaApp`] - media receiver launch and `LOAD`
/// - [`Addressing`] - default source/destination pair
pub mod command;

/// Device discovery seam.
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Protocol message types.
pub mod protocol;

/// URL resolver chain.
pub mod resolver;

/// Frame codec and request dispatcher.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Session
pub use client::Client;

// Commands
pub use command::{Addressing, Launcher, MediaApp};

// Collaborators
pub use discovery::{Device, Scanner, first_device};
pub use resolver::{Delivery, Loader, ResolverChain, UrlResolver};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// Protocol types
pub use protocol::{
    Application, Envelope, Event, EventReply, MediaItem, Status, StreamType, Volume, namespace,
};

// Transport types
pub use transport::{Connection, ConnectionOptions, EventHandler, FrameCodec, PendingResponse};
