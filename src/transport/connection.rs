//! Connection and receive loop.
//!
//! This module multiplexes many logical conversations over one stream,
//! correlating requests and responses by `requestId`.
//!
//! # Receive Loop
//!
//! The connection spawns one tokio task that:
//!
//! - Reads frames from the [`FrameCodec`] strictly one at a time
//! - Delivers correlated replies to their waiters
//! - Answers heartbeat pings
//! - Hands unsolicited messages to the event handler
//! - Abandons every pending request when the stream terminates
//!
//! # Request Lifecycle
//!
//! ```text
//! request() ──► Pending ──► Delivered   (reply with matching requestId)
//!                  │
//!                  ├──────► Abandoned   (stream ended or shutdown)
//!                  └──────► Cancelled   (timeout or handle dropped)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{Notify, oneshot};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Envelope, Event, EventReply, HeartbeatCommand, namespace};

use super::codec::FrameCodec;
use super::options::ConnectionOptions;

// ============================================================================
// Constants
// ============================================================================

/// Bound on shutting down the write half once the loop stops.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Types
// ============================================================================

/// Raw UTF-8 JSON payload of a message.
pub type Payload = Vec<u8>;

/// Event handler callback type.
///
/// Called for each unsolicited message. Return `Some(EventReply)` to send a
/// reply on the same connection.
pub type EventHandler = Box<dyn Fn(&Event) -> Option<EventReply> + Send + Sync>;

/// Installed handler; cloned out of its slot before each call.
type SharedHandler = Arc<dyn Fn(&Event) -> Option<EventReply> + Send + Sync>;

/// An in-flight request.
struct PendingRequest {
    waiter: oneshot::Sender<Payload>,
    command: String,
    created_at: Instant,
}

/// Map of request IDs to waiters.
type CorrelationMap = FxHashMap<RequestId, PendingRequest>;

/// Pending table plus the closed flag, guarded together so no request can
/// register after the table has been drained.
#[derive(Default)]
struct Correlation {
    pending: CorrelationMap,
    closed: bool,
}

/// Minimal view of an inbound payload used for routing.
#[derive(Debug, Deserialize)]
struct ReplyHeader {
    #[serde(rename = "requestId", default)]
    request_id: Option<RequestId>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// State shared between handles and the receive loop.
struct Shared {
    codec: FrameCodec,
    correlation: Mutex<Correlation>,
    next_id: AtomicU64,
    closed: AtomicBool,
    shutdown: Notify,
    event_handler: Mutex<Option<SharedHandler>>,
    options: ConnectionOptions,
}

// ============================================================================
// Connection
// ============================================================================

/// Request dispatcher over one duplex stream.
///
/// Cheap to clone; all clones share the same stream, pending table and
/// receive loop.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync`. Any number of tasks may call
/// [`Connection::request`] and [`Connection::send`] concurrently.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Creates a connection over a stream and spawns its receive loop.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid.
    pub fn new<S>(stream: S, options: ConnectionOptions) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        options.validate()?;
        let codec = FrameCodec::new(stream, options.max_frame_size);
        Ok(Self::with_codec(codec, options))
    }

    /// Creates a connection over an existing codec and spawns its receive loop.
    pub fn with_codec(codec: FrameCodec, options: ConnectionOptions) -> Self {
        let shared = Arc::new(Shared {
            codec,
            correlation: Mutex::new(Correlation::default()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
            event_handler: Mutex::new(None),
            options,
        });

        tokio::spawn(Self::run_receive_loop(Arc::clone(&shared)));

        Self { shared }
    }

    /// Sets the event handler callback.
    ///
    /// The handler may itself replace or clear the handler; the change
    /// applies from the next event on.
    pub fn set_event_handler(&self, handler: EventHandler) {
        *self.shared.event_handler.lock() = Some(Arc::from(handler));
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        *self.shared.event_handler.lock() = None;
    }

    /// Returns the connection options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.shared.options
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.correlation.lock().pending.len()
    }

    /// Returns `true` once the receive loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Returns the number of frames written so far.
    #[inline]
    #[must_use]
    pub fn frames_sent(&self) -> u64 {
        self.shared.codec.frames_sent()
    }

    /// Returns the number of frames read so far.
    #[inline]
    #[must_use]
    pub fn frames_received(&self) -> u64 {
        self.shared.codec.frames_received()
    }

    /// Stops the receive loop and abandons all pending requests.
    pub fn shutdown(&self) {
        self.shared.shutdown.notify_one();
    }
}

// ============================================================================
// Connection - Sending
// ============================================================================

impl Connection {
    /// Sends an uncorrelated message.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the receive loop has stopped
    /// - [`Error::Json`] if the payload cannot be serialized
    /// - Codec errors from [`FrameCodec::send`]
    pub async fn send<T>(&self, envelope: &Envelope, payload: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        let bytes = serde_json::to_vec(payload)?;
        self.shared.codec.send(envelope, &bytes).await
    }

    /// Sends a correlated request and returns a handle to its reply.
    ///
    /// Allocates the next request id, injects it as `requestId`, registers
    /// the waiter and writes the frame. Returns as soon as the frame is
    /// written; await the reply through the returned handle.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] / [`Error::Protocol`] if the payload is not a JSON
    ///   object. Nothing is registered.
    /// - [`Error::ConnectionClosed`] if the receive loop has stopped
    /// - [`Error::Protocol`] if too many requests are pending
    /// - Codec errors from [`FrameCodec::send`]; the registration is removed
    pub async fn request<T>(&self, envelope: &Envelope, payload: &T) -> Result<PendingResponse>
    where
        T: Serialize + ?Sized,
    {
        let mut object = match serde_json::to_value(payload)? {
            Value::Object(object) => object,
            other => {
                return Err(Error::protocol(format!(
                    "request payload must be a JSON object, got {other}"
                )));
            }
        };

        let command = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();

        let (waiter, response_rx) = oneshot::channel();
        let request_id = self.register(&command, waiter)?;

        // From here on the handle owns the entry: any early return, or this
        // future being dropped mid-send, releases it.
        let pending = PendingResponse {
            request_id,
            command,
            response_rx,
            shared: Arc::clone(&self.shared),
        };

        object.insert("requestId".to_string(), Value::from(request_id.as_u64()));
        let bytes = serde_json::to_vec(&object)?;
        self.shared.codec.send(envelope, &bytes).await?;

        trace!(%request_id, command = %pending.command, "Request sent");
        Ok(pending)
    }

    /// Allocates an id and registers the waiter under it.
    ///
    /// Ids wrap around; the broadcast id and ids still pending are skipped.
    fn register(&self, command: &str, waiter: oneshot::Sender<Payload>) -> Result<RequestId> {
        let mut correlation = self.shared.correlation.lock();

        if correlation.closed {
            return Err(Error::ConnectionClosed);
        }

        let max = self.shared.options.max_pending_requests;
        if correlation.pending.len() >= max {
            warn!(
                pending = correlation.pending.len(),
                max, "Too many pending requests"
            );
            return Err(Error::protocol(format!(
                "Too many pending requests: {}/{}",
                correlation.pending.len(),
                max
            )));
        }

        // Skip ids still in use (only possible after wrap) and the broadcast id.
        let request_id = loop {
            let candidate = RequestId::new(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
            if !candidate.is_broadcast() && !correlation.pending.contains_key(&candidate) {
                break candidate;
            }
        };

        correlation.pending.insert(
            request_id,
            PendingRequest {
                waiter,
                command: command.to_string(),
                created_at: Instant::now(),
            },
        );

        Ok(request_id)
    }
}

// ============================================================================
// Connection - Receive Loop
// ============================================================================

impl Connection {
    /// Receive loop: runs until the stream terminates or shutdown is requested.
    async fn run_receive_loop(shared: Arc<Shared>) {
        let mut shutdown_requested = false;

        loop {
            tokio::select! {
                biased;

                _ = shared.shutdown.notified() => {
                    debug!("Shutdown requested");
                    shutdown_requested = true;
                    break;
                }

                result = shared.codec.receive() => {
                    match result {
                        Ok((envelope, payload)) => {
                            Self::handle_incoming(&shared, envelope, payload).await;
                        }

                        Err(e) if e.is_terminal() => {
                            debug!(error = %e, "Stream terminated");
                            break;
                        }

                        Err(e) => {
                            warn!(error = %e, "Dropping unreadable frame");
                        }
                    }
                }
            }
        }

        // Waiters are released before touching the writer, which a stalled
        // send may hold indefinitely.
        Self::abandon_pending(&shared);

        if shutdown_requested {
            match timeout(CLOSE_TIMEOUT, shared.codec.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "Failed to close stream"),
                Err(_) => debug!("Timed out closing stream"),
            }
        }

        debug!("Receive loop terminated");
    }

    /// Routes one inbound message.
    async fn handle_incoming(shared: &Shared, envelope: Envelope, payload: Payload) {
        let header = serde_json::from_slice::<ReplyHeader>(&payload).ok();

        if let Some(request_id) = header.as_ref().and_then(|h| h.request_id)
            && !request_id.is_broadcast()
        {
            let pending = shared.correlation.lock().pending.remove(&request_id);

            if let Some(pending) = pending {
                trace!(
                    %request_id,
                    command = %pending.command,
                    elapsed_ms = pending.created_at.elapsed().as_millis() as u64,
                    "Delivering response"
                );
                if pending.waiter.send(payload).is_err() {
                    debug!(%request_id, "Waiter dropped before delivery");
                }
                return;
            }

            debug!(%request_id, "Response for unknown request");
        }

        if shared.options.auto_heartbeat
            && envelope.namespace() == namespace::HEARTBEAT
            && header.as_ref().and_then(|h| h.kind.as_deref()) == Some("PING")
        {
            Self::reply(shared, &envelope.reply(), &HeartbeatCommand::Pong).await;
            return;
        }

        let event = Event::new(envelope, payload);
        let handler = shared.event_handler.lock().clone();
        let reply = handler.and_then(|handler| handler(&event));

        if let Some(reply) = reply
            && let Err(e) = shared.codec.send(&reply.envelope, &reply.payload).await
        {
            warn!(error = %e, "Failed to send event reply");
        }
    }

    /// Sends a reply from inside the loop, logging failures.
    async fn reply<T: Serialize>(shared: &Shared, envelope: &Envelope, payload: &T) {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize reply");
                return;
            }
        };
        if let Err(e) = shared.codec.send(envelope, &bytes).await {
            warn!(error = %e, "Failed to send reply");
        }
    }

    /// Closes the table and drops every waiter, which wakes each with
    /// [`Error::EmptyResponse`].
    fn abandon_pending(shared: &Shared) {
        let pending: Vec<_> = {
            let mut correlation = shared.correlation.lock();
            correlation.closed = true;
            shared.closed.store(true, Ordering::Release);
            correlation.pending.drain().collect()
        };

        let count = pending.len();
        for (request_id, request) in pending {
            trace!(%request_id, command = %request.command, "Abandoning request");
            drop(request.waiter);
        }

        if count > 0 {
            debug!(count, "Abandoned pending requests");
        }
    }
}

// ============================================================================
// PendingResponse
// ============================================================================

/// Handle to the reply of one request.
///
/// Yields exactly one payload, or [`Error::EmptyResponse`] if the connection
/// terminates first. Dropping the handle, or a `wait` future holding it,
/// cancels the request.
pub struct PendingResponse {
    request_id: RequestId,
    command: String,
    response_rx: oneshot::Receiver<Payload>,
    shared: Arc<Shared>,
}

impl fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResponse")
            .field("request_id", &self.request_id)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl PendingResponse {
    /// Returns the correlation id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the command type of the request.
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Waits for the reply with no bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyResponse`] if the request was abandoned.
    pub async fn wait(mut self) -> Result<Payload> {
        (&mut self.response_rx)
            .await
            .map_err(|_| Error::empty_response(&self.command, self.request_id))
    }

    /// Waits for the reply for at most `limit`.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestTimeout`] if nothing arrives in time; the request is
    ///   removed from the pending table
    /// - [`Error::EmptyResponse`] if the request was abandoned
    pub async fn wait_timeout(mut self, limit: Duration) -> Result<Payload> {
        match timeout(limit, &mut self.response_rx).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => Err(Error::empty_response(&self.command, self.request_id)),
            Err(_) => {
                self.shared
                    .correlation
                    .lock()
                    .pending
                    .remove(&self.request_id);
                debug!(request_id = %self.request_id, "Removed timed-out request");

                Err(Error::request_timeout(
                    &self.command,
                    self.request_id,
                    limit.as_millis() as u64,
                ))
            }
        }
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        // Delivered and abandoned entries are already gone; only a request
        // still waiting for its reply owns an entry.
        if matches!(self.response_rx.try_recv(), Err(TryRecvError::Empty)) {
            self.shared
                .correlation
                .lock()
                .pending
                .remove(&self.request_id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
