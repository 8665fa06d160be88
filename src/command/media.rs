//! Media application commands.
//!
//! Loading content takes three steps: launch the default media receiver
//! (or reuse it when a known status already lists it), open a virtual
//! connection to its transport id, then send a correlated `LOAD` on the
//! media namespace.
//!
//! # Example
//!
//! ```ignore
//! let app = MediaApp::launch_and_connect(&client, &[status]).await?;
//! let mut delivery = app.load(MediaItem::new(url, "video/mp4")).await?;
//! while let Some(update) = delivery.recv().await { /* ... */ }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::protocol::{Envelope, MediaCommand, MediaItem, MediaReply, Status, namespace};
use crate::resolver::Delivery;
use crate::transport::Connection;

use super::Addressing;

// ============================================================================
// Constants
// ============================================================================

/// App id of the default media receiver.
pub const DEFAULT_MEDIA_RECEIVER: &str = "CC1AD845";

/// Reply type of a successful media command.
const MEDIA_STATUS: &str = "MEDIA_STATUS";

// ============================================================================
// MediaApp
// ============================================================================

/// Handle to a running media application.
#[derive(Debug, Clone)]
pub struct MediaApp {
    connection: Connection,
    envelope: Envelope,
    request_timeout: Duration,
}

impl MediaApp {
    /// Creates a handle addressing the media namespace of `addressing.destination`.
    ///
    /// The destination must be the application's transport id, already
    /// connected through [`Client::connect_app`].
    #[must_use]
    pub fn new(connection: Connection, addressing: &Addressing) -> Self {
        let request_timeout = connection.options().request_timeout;
        Self {
            envelope: addressing.envelope(namespace::MEDIA),
            connection,
            request_timeout,
        }
    }

    /// Launches the default media receiver unless one of `known` lists it,
    /// then connects to its transport.
    ///
    /// # Errors
    ///
    /// - Any error from [`crate::Launcher::launch`]
    /// - [`Error::Protocol`] if the status does not give the app's transport id
    /// - Any error sending `CONNECT`
    pub async fn launch_and_connect(client: &Client, known: &[Status]) -> Result<Self> {
        let status = client.launcher().launch(DEFAULT_MEDIA_RECEIVER, known).await?;

        let transport_id = status
            .app_with_id(DEFAULT_MEDIA_RECEIVER)
            .and_then(|app| app.transport_id.as_deref())
            .ok_or_else(|| {
                Error::protocol(format!(
                    "status lists no transportId for {DEFAULT_MEDIA_RECEIVER}"
                ))
            })?;

        let addressing = client.connect_app(transport_id).await?;
        Ok(Self::new(client.connection().clone(), &addressing))
    }

    /// Overrides the bounded wait for replies.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Returns the envelope every command is sent with.
    #[inline]
    #[must_use]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Loads `item` and starts playback.
    ///
    /// The returned channel yields the receiver's `MEDIA_STATUS` reply and
    /// then closes.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyResponse`] if the connection terminates first
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::Receiver`] if the receiver rejects the load
    /// - [`Error::Decode`] if the reply is not a media reply
    pub async fn load(&self, item: MediaItem) -> Result<Delivery> {
        debug!(content_id = %item.content_id, content_type = %item.content_type, "Loading media");

        let command = MediaCommand::load(item);
        let kind = command.kind();
        let pending = self.connection.request(&self.envelope, &command).await?;
        let payload = pending.wait_timeout(self.request_timeout).await?;
        check_media_reply(kind, &payload)?;

        let (tx, rx) = mpsc::channel(1);
        // Fresh channel with room for one item.
        let _ = tx.try_send(payload);
        Ok(rx)
    }
}

/// Checks a media reply for `command`.
///
/// # Errors
///
/// - [`Error::Decode`] if the payload is not a typed JSON reply
/// - [`Error::Receiver`] if the reply is anything but `MEDIA_STATUS`
pub fn check_media_reply(command: &str, payload: &[u8]) -> Result<()> {
    let reply: MediaReply = serde_json::from_slice(payload)
        .map_err(|e| Error::decode(command, e.to_string(), payload))?;

    match reply.kind {
        Some(kind) if kind == MEDIA_STATUS => Ok(()),
        Some(kind) => Err(Error::receiver(command, kind, reply.reason)),
        None => Err(Error::decode(command, "missing field `type`", payload)),
    }
}

// ============================================================================
// Tests
// ============================================================================
