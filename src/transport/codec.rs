//! Length-prefixed frame codec.
//!
//! Each frame is a 4-byte big-endian body length followed by a protobuf
//! [`CastMessage`] body. A zero length is invalid.
//!
//! # Failure Policy
//!
//! | Condition | Error | Connection usable |
//! |-----------|-------|-------------------|
//! | Zero length prefix | [`Error::EmptyFrame`] | yes |
//! | Body over the limit | [`Error::FrameTooLarge`] (body discarded) | yes |
//! | Undecodable body | [`Error::MalformedFrame`] | yes |
//! | End of stream | [`Error::ConnectionClosed`] | no |
//! | Other read/write failure | [`Error::Io`] | no |

// ============================================================================
// Imports
// ============================================================================

use std::io::{Error as IoError, ErrorKind};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::{CastMessage, Envelope};

// ============================================================================
// Constants
// ============================================================================

/// Size of the length prefix.
pub const PREFIX_LEN: usize = 4;

// ============================================================================
// Types
// ============================================================================

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

// ============================================================================
// Pure Encoding
// ============================================================================

/// Encodes one frame: length prefix followed by the message body.
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] if `payload` is not UTF-8.
pub fn encode_frame(envelope: &Envelope, payload: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| Error::malformed_frame(format!("payload is not UTF-8: {e}")))?;

    let body = CastMessage::text(envelope, text).to_bytes();
    let length = u32::try_from(body.len())
        .map_err(|_| Error::malformed_frame("frame body does not fit a u32 length"))?;

    let mut frame = Vec::with_capacity(PREFIX_LEN + body.len());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decodes a frame body (without prefix) into envelope and payload.
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] if the body is not a text message.
pub fn decode_body(body: &[u8]) -> Result<(Envelope, Vec<u8>)> {
    let (envelope, payload) = CastMessage::from_bytes(body)?.into_parts()?;
    Ok((envelope, payload.into_bytes()))
}

/// Decodes a complete frame held in memory.
///
/// The declared length must match the remaining bytes exactly.
///
/// # Errors
///
/// - [`Error::EmptyFrame`] if the declared length is zero
/// - [`Error::MalformedFrame`] on truncation, trailing bytes, or a bad body
pub fn decode_frame(frame: &[u8]) -> Result<(Envelope, Vec<u8>)> {
    let Some((prefix, body)) = frame.split_first_chunk::<PREFIX_LEN>() else {
        return Err(Error::malformed_frame("truncated length prefix"));
    };

    let length = u32::from_be_bytes(*prefix);
    if length == 0 {
        return Err(Error::EmptyFrame);
    }
    if body.len() != length as usize {
        return Err(Error::malformed_frame(format!(
            "declared {length} bytes, found {}",
            body.len()
        )));
    }

    decode_body(body)
}

/// Maps a stream failure to a terminal error.
fn terminal(err: IoError) -> Error {
    match err.kind() {
        ErrorKind::UnexpectedEof => Error::ConnectionClosed,
        _ => Error::Io(err),
    }
}

// ============================================================================
// FrameCodec
// ============================================================================

/// Owns the duplex stream and moves whole frames across it.
///
/// Writers are serialized by one lock so frames never interleave on the
/// wire. Readers are serialized by another.
pub struct FrameCodec {
    reader: Mutex<BoxedReader>,
    writer: Mutex<BoxedWriter>,
    max_frame_size: u32,
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
}

impl FrameCodec {
    /// Creates a codec over a duplex stream.
    pub fn new<S>(stream: S, max_frame_size: u32) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        Self::from_parts(reader, writer, max_frame_size)
    }

    /// Creates a codec over separate read and write halves.
    pub fn from_parts<R, W>(reader: R, writer: W, max_frame_size: u32) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader: Mutex::new(Box::new(reader)),
            writer: Mutex::new(Box::new(writer)),
            max_frame_size,
            frames_sent: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
        }
    }

    /// Serializes and writes one frame.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedFrame`] / [`Error::FrameTooLarge`] before anything is written
    /// - [`Error::ConnectionClosed`] / [`Error::Io`] if the write fails
    pub async fn send(&self, envelope: &Envelope, payload: &[u8]) -> Result<()> {
        let frame = encode_frame(envelope, payload)?;

        let length = (frame.len() - PREFIX_LEN) as u32;
        if length > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                length,
                max: self.max_frame_size,
            });
        }

        debug!(
            source = envelope.source(),
            destination = envelope.destination(),
            namespace = envelope.namespace(),
            payload = %String::from_utf8_lossy(payload),
            "Sending frame"
        );

        let mut writer = self.writer.lock().await;
        writer.write_all(&frame).await.map_err(terminal)?;
        writer.flush().await.map_err(terminal)?;
        drop(writer);

        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Reads and deserializes one frame.
    ///
    /// # Errors
    ///
    /// See the module-level failure policy.
    pub async fn receive(&self) -> Result<(Envelope, Vec<u8>)> {
        let mut reader = self.reader.lock().await;

        let mut prefix = [0u8; PREFIX_LEN];
        reader.read_exact(&mut prefix).await.map_err(terminal)?;

        let length = u32::from_be_bytes(prefix);
        if length == 0 {
            return Err(Error::EmptyFrame);
        }

        if length > self.max_frame_size {
            let mut oversized = (&mut *reader).take(u64::from(length));
            let skipped = tokio::io::copy(&mut oversized, &mut tokio::io::sink())
                .await
                .map_err(terminal)?;
            if skipped < u64::from(length) {
                return Err(Error::ConnectionClosed);
            }
            trace!(length, "Discarded oversized frame");
            return Err(Error::FrameTooLarge {
                length,
                max: self.max_frame_size,
            });
        }

        let mut body = vec![0u8; length as usize];
        reader.read_exact(&mut body).await.map_err(terminal)?;
        drop(reader);

        self.frames_received.fetch_add(1, Ordering::Relaxed);
        let (envelope, payload) = decode_body(&body)?;

        debug!(
            source = envelope.source(),
            destination = envelope.destination(),
            namespace = envelope.namespace(),
            payload = %String::from_utf8_lossy(&payload),
            "Received frame"
        );

        Ok((envelope, payload))
    }

    /// Shuts down the write half.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the shutdown fails.
    pub async fn close(&self) -> Result<()> {
        self.writer.lock().await.shutdown().await.map_err(terminal)
    }

    /// Returns the number of frames written.
    #[inline]
    #[must_use]
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Returns the number of complete frames read.
    #[inline]
    #[must_use]
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Returns the frame body limit.
    #[inline]
    #[must_use]
    pub fn max_frame_size(&self) -> u32 {
        self.max_frame_size
    }
}

// ============================================================================
// Tests
// ============================================================================
