//! Receiver control commands.
//!
//! Every command goes through the same primitive: send a
//! [`ReceiverCommand`] on the receiver namespace, wait for the correlated
//! reply, decode its `status`.
//!
//! # Example
//!
//! ```ignore
//! let launcher = Launcher::new(connection, &Addressing::default());
//!
//! let status = launcher.status().await?;
//! let status = launcher.launch("CC1AD845", &[status]).await?;
//! launcher.set_volume(0.5).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Envelope, ReceiverCommand, Status, StatusReply, Volume, namespace};
use crate::transport::Connection;

use super::Addressing;

// ============================================================================
// Constants
// ============================================================================

/// Reply type of a successful receiver command.
const RECEIVER_STATUS: &str = "RECEIVER_STATUS";

// ============================================================================
// Launcher
// ============================================================================

/// Typed command builder for the receiver namespace.
#[derive(Debug, Clone)]
pub struct Launcher {
    connection: Connection,
    envelope: Envelope,
    request_timeout: Duration,
}

impl Launcher {
    /// Creates a launcher addressing the receiver namespace.
    ///
    /// Uses the connection's request timeout as the bounded wait.
    #[must_use]
    pub fn new(connection: Connection, addressing: &Addressing) -> Self {
        let request_timeout = connection.options().request_timeout;
        Self {
            envelope: addressing.envelope(namespace::RECEIVER),
            connection,
            request_timeout,
        }
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

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

// ============================================================================
// Launcher - Commands
// ============================================================================

impl Launcher {
    /// Queries the receiver status.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyResponse`] if the connection terminates first
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::Decode`] if the reply carries no valid status
    pub async fn status(&self) -> Result<Status> {
        debug!("Getting receiver status");
        self.status_request(ReceiverCommand::GetStatus).await
    }

    /// Launches `app_id` unless it already runs in one of `known`.
    ///
    /// When a known status lists the application, that status is returned
    /// without any traffic.
    ///
    /// # Errors
    ///
    /// Same as [`Launcher::status`], plus [`Error::Receiver`] if the
    /// receiver refuses the launch.
    pub async fn launch(&self, app_id: &str, known: &[Status]) -> Result<Status> {
        if let Some(status) = known.iter().find(|st| st.app_with_id(app_id).is_some()) {
            debug!(app_id, "Application already running");
            return Ok(status.clone());
        }

        debug!(app_id, "Launching application");
        self.status_request(ReceiverCommand::Launch {
            app_id: app_id.to_string(),
        })
        .await
    }

    /// Stops the running application.
    ///
    /// # Errors
    ///
    /// Same as [`Launcher::status`].
    pub async fn stop(&self) -> Result<Status> {
        debug!("Stopping application");
        self.status_request(ReceiverCommand::Stop).await
    }

    /// Sets the volume level, leaving the mute state alone.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `level` is outside `[0, 1]`; nothing is sent
    /// - Same as [`Launcher::status`]
    pub async fn set_volume(&self, level: f64) -> Result<Status> {
        if !(0.0..=1.0).contains(&level) {
            return Err(Error::invalid_argument(format!(
                "volume level {level} is outside [0, 1]"
            )));
        }

        debug!(level, "Setting volume");
        self.status_request(ReceiverCommand::SetVolume {
            volume: Volume::level(level),
        })
        .await
    }

    /// Sets the mute state, leaving the level alone.
    ///
    /// # Errors
    ///
    /// Same as [`Launcher::status`].
    pub async fn mute(&self, muted: bool) -> Result<Status> {
        debug!(muted, "Setting mute");
        self.status_request(ReceiverCommand::SetVolume {
            volume: Volume::muted(muted),
        })
        .await
    }
}

// ============================================================================
// Launcher - Internal
// ============================================================================

impl Launcher {
    /// Sends a command and decodes the correlated status reply.
    async fn status_request(&self, command: ReceiverCommand) -> Result<Status> {
        let kind = command.kind();
        let pending = self.connection.request(&self.envelope, &command).await?;
        let payload = pending.wait_timeout(self.request_timeout).await?;
        decode_status(kind, &payload)
    }
}

/// Decodes a status reply for `command`.
///
/// # Errors
///
/// - [`Error::Decode`] if the payload is not a status reply
/// - [`Error::Receiver`] if the receiver answered with an error reply
pub fn decode_status(command: &str, payload: &[u8]) -> Result<Status> {
    let reply: StatusReply = serde_json::from_slice(payload)
        .map_err(|e| Error::decode(command, e.to_string(), payload))?;

    match reply {
        StatusReply {
            status: Some(status),
            ..
        } => Ok(status),
        StatusReply {
            kind: Some(kind),
            reason,
            ..
        } if kind != RECEIVER_STATUS => Err(Error::receiver(command, kind, reason)),
        _ => Err(Error::decode(command, "missing field `status`", payload)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};
    use tokio::io::duplex;

    use crate::testing::FakeReceiver;
    use crate::transport::ConnectionOptions;

    fn launcher() -> (Launcher, FakeReceiver) {
        let (local, remote) = duplex(64 * 1024);
        let connection = Connection::new(local, ConnectionOptions::default()).expect("connection");
        (
            Launcher::new(connection, &Addressing::default()),
            FakeReceiver::new(remote),
        )
    }

    /// Reads one request and answers it with `reply` plus its requestId.
    async fn answer(receiver: &FakeReceiver, mut reply: Value) -> Value {
        let (env, request) = receiver.next_json().await;
        reply["requestId"] = request["requestId"].clone();
        receiver.send_json(&env.reply(), &reply).await;
        request
    }

    fn running(app_id: &str) -> Status {
        serde_json::from_value(json!({
            "applications": [{ "appId": app_id }],
            "volume": { "level": 1.0, "muted": false }
        }))
        .expect("status")
    }

    #[tokio::test]
    async fn test_status_end_to_end() {
        let (launcher, receiver) = launcher();

        let (status, request) = tokio::join!(
            launcher.status(),
            answer(
                &receiver,
                json!({ "status": { "applications": [], "volume": { "level": 1.0, "muted": false } } }),
            )
        );

        assert_eq!(request, json!({ "type": "GET_STATUS", "requestId": 1 }));
        let status = status.expect("status");
        assert!(status.applications.is_empty());
        assert_eq!(status.volume.level, Some(1.0));
        assert_eq!(status.volume.muted, Some(false));
    }

    #[tokio::test]
    async fn test_envelope_targets_receiver_namespace() {
        let (launcher, receiver) = launcher();

        let (_, _) = tokio::join!(launcher.stop(), async {
            let (env, request) = receiver.next_json().await;
            assert_eq!(env.source(), "sender-0");
            assert_eq!(env.destination(), "receiver-0");
            assert_eq!(env.namespace(), namespace::RECEIVER);
            assert_eq!(request["type"], "STOP");
            receiver
                .send_json(
                    &env.reply(),
                    &json!({ "requestId": request["requestId"], "status": {} }),
                )
                .await;
        });
    }

    #[tokio::test]
    async fn test_launch_short_circuit() {
        let (launcher, receiver) = launcher();
        let known = running("CC1AD845");

        let status = launcher
            .launch("CC1AD845", std::slice::from_ref(&known))
            .await
            .expect("launch");

        assert_eq!(status, known);
        assert_eq!(launcher.connection().frames_sent(), 0);
        assert!(receiver.is_silent_for(50).await);
    }

    #[tokio::test]
    async fn test_launch_sends_app_id() {
        let (launcher, receiver) = launcher();
        let known = [running("E8C28D3C")];

        let (status, request) = tokio::join!(
            launcher.launch("CC1AD845", &known),
            answer(
                &receiver,
                json!({ "status": { "applications": [{ "appId": "CC1AD845", "transportId": "web-7" }] } }),
            )
        );

        assert_eq!(request["type"], "LAUNCH");
        assert_eq!(request["appId"], "CC1AD845");
        let status = status.expect("status");
        let app = status.app_with_id("CC1AD845").expect("launched");
        assert_eq!(app.transport_id.as_deref(), Some("web-7"));
    }

    #[tokio::test]
    async fn test_set_volume_omits_muted() {
        let (launcher, receiver) = launcher();

        let (status, request) = tokio::join!(
            launcher.set_volume(0.5),
            answer(&receiver, json!({ "status": { "volume": { "level": 0.5 } } }))
        );

        assert_eq!(request["volume"], json!({ "level": 0.5 }));
        assert!(request["volume"].get("muted").is_none());
        assert_eq!(status.expect("status").volume.level, Some(0.5));
    }

    #[tokio::test]
    async fn test_mute_omits_level() {
        let (launcher, receiver) = launcher();

        let (status, request) = tokio::join!(
            launcher.mute(true),
            answer(&receiver, json!({ "status": { "volume": { "muted": true } } }))
        );

        assert_eq!(request["type"], "SET_VOLUME");
        assert_eq!(request["volume"], json!({ "muted": true }));
        assert!(request["volume"].get("level").is_none());
        assert_eq!(status.expect("status").volume.muted, Some(true));
    }

    #[tokio::test]
    async fn test_set_volume_out_of_range() {
        let (launcher, _receiver) = launcher();

        for level in [-0.1, 1.5, f64::NAN] {
            let result = launcher.set_volume(level).await;
            assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        }
        assert_eq!(launcher.connection().frames_sent(), 0);
    }

    #[tokio::test]
    async fn test_receiver_error_reply() {
        let (launcher, receiver) = launcher();

        let (result, _) = tokio::join!(
            launcher.launch("DEADBEEF", &[]),
            answer(&receiver, json!({ "type": "LAUNCH_ERROR", "reason": "NOT_FOUND" }))
        );

        match result {
            Err(Error::Receiver { command, kind, reason }) => {
                assert_eq!(command, "LAUNCH");
                assert_eq!(kind, "LAUNCH_ERROR");
                assert_eq!(reason.as_deref(), Some("NOT_FOUND"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_error_keeps_context() {
        let (launcher, receiver) = launcher();

        let (result, _) = tokio::join!(
            launcher.status(),
            answer(&receiver, json!({ "status": { "applications": "nope" } }))
        );

        match result {
            Err(Error::Decode { command, payload, .. }) => {
                assert_eq!(command, "GET_STATUS");
                assert!(payload.contains("nope"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_loss_is_empty_response() {
        let (launcher, receiver) = launcher();

        let (result, _) = tokio::join!(launcher.stop(), async move {
            let _ = receiver.next_json().await;
            drop(receiver);
        });

        assert!(matches!(result, Err(Error::EmptyResponse { .. })));
    }

    #[tokio::test]
    async fn test_silent_receiver_times_out() {
        let (launcher, receiver) = launcher();
        let launcher = launcher.with_request_timeout(Duration::from_millis(30));

        let (result, _) = tokio::join!(launcher.status(), receiver.next_json());

        assert!(matches!(result, Err(Error::RequestTimeout { .. })));
        assert_eq!(launcher.connection().pending_count(), 0);
    }

    #[test]
    fn test_decode_status_missing_status() {
        let result = decode_status("GET_STATUS", br#"{"requestId":1,"type":"RECEIVER_STATUS"}"#);
        assert!(matches!(result, Err(Error::Decode { .. })));

        let result = decode_status("GET_STATUS", b"not json");
        assert!(matches!(result, Err(Error::Decode { .. })));
    }
}
